use crate::application::SharedCollection;
use crate::domain::entities::record::Record;
use crate::domain::entities::search_hit::SearchHit;
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{embed_one, EmbeddingProvider, InputType};
use crate::domain::values::config::StoreConfig;
use crate::domain::values::similarity::cosine_similarity;
use std::sync::Arc;
use tracing::debug;

pub struct SearchUseCase {
    config: Arc<StoreConfig>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: SharedCollection,
}

impl SearchUseCase {
    pub fn new(config: Arc<StoreConfig>, embedder: Arc<dyn EmbeddingProvider>, index: SharedCollection) -> Self {
        Self {
            config,
            embedder,
            index,
        }
    }

    /// Embeds `query` and ranks every record against it. `None` falls back to
    /// the configured threshold / result count.
    pub async fn execute(
        &self,
        query: &str,
        threshold: Option<f64>,
        num_results: Option<usize>,
    ) -> Result<Vec<SearchHit>, DomainError> {
        let vector = embed_one(self.embedder.as_ref(), query, InputType::Query).await?;
        self.search_by_vector(&vector, threshold, num_results).await
    }

    pub async fn search_by_vector(
        &self,
        vector: &[f32],
        threshold: Option<f64>,
        num_results: Option<usize>,
    ) -> Result<Vec<SearchHit>, DomainError> {
        DomainError::check_vector(self.config.dimension(), vector)?;
        let threshold = threshold.unwrap_or(self.config.threshold());
        let limit = num_results.unwrap_or(self.config.num_results());

        let index = self.index.read().await;
        let hits = rank(index.iter(), vector, threshold, limit);
        debug!(
            collection = self.config.name(),
            scanned = index.len(),
            returned = hits.len(),
            threshold,
            "search complete"
        );
        Ok(hits)
    }
}

/// Scores `records` against `query`, keeps those at or above `threshold`,
/// and returns the best `limit` by descending score. Equal scores keep the
/// order in which `records` yields them.
pub fn rank<'a>(
    records: impl Iterator<Item = &'a Record>,
    query: &[f32],
    threshold: f64,
    limit: usize,
) -> Vec<SearchHit> {
    let mut scored: Vec<(f64, &Record)> = records
        .map(|r| (cosine_similarity(query, &r.vector), r))
        .filter(|(score, _)| *score >= threshold)
        .collect();

    // stable: ties stay in insertion order
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(limit);

    scored
        .into_iter()
        .map(|(score, r)| SearchHit {
            id: r.id.clone(),
            text: r.text.clone(),
            score,
        })
        .collect()
}
