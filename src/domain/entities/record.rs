use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted document: its source text and the embedding computed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub text: String,
    pub vector: Vec<f32>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Record {
    pub fn new(id: String, text: String, vector: Vec<f32>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text,
            vector,
            created_at,
            updated_at: created_at,
        }
    }

    /// Replacement for `self` carrying new content but the original position
    /// (`created_at`) in the collection.
    pub fn overwritten_by(&self, text: String, vector: Vec<f32>) -> Self {
        Self {
            id: self.id.clone(),
            text,
            vector,
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}
