use crate::application::{run_commit, SharedCollection};
use crate::domain::entities::record::Record;
use crate::domain::error::DomainError;
use crate::domain::ports::record_repository::RecordRepository;
use std::sync::Arc;
use tracing::info;

/// Direct access to records by id.
pub struct DocumentsUseCase {
    repo: Arc<dyn RecordRepository>,
    index: SharedCollection,
}

impl DocumentsUseCase {
    pub fn new(repo: Arc<dyn RecordRepository>, index: SharedCollection) -> Self {
        Self { repo, index }
    }

    pub async fn get(&self, id: &str) -> Result<Record, DomainError> {
        self.index
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("record {id}")))
    }

    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let mut index = self.index.clone().write_owned().await;
        if !index.contains(id) {
            return Err(DomainError::NotFound(format!("record {id}")));
        }
        let repo = self.repo.clone();
        let id = id.to_string();

        run_commit(async move {
            repo.delete(&id).await?;
            index.remove(&id);
            info!(id = %id, "record deleted");
            Ok(())
        })
        .await
    }

    pub async fn list_ids(&self) -> Vec<String> {
        self.index.read().await.ids()
    }

    pub async fn len(&self) -> usize {
        self.index.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.index.read().await.is_empty()
    }
}
