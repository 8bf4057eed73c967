use crate::domain::entities::collection::Collection;
use crate::domain::error::DomainError;
use crate::domain::ports::record_repository::RecordRepository;
use crate::domain::values::config::StoreConfig;
use std::sync::Arc;
use tracing::info;

pub struct LoadUseCase {
    config: Arc<StoreConfig>,
    repo: Arc<dyn RecordRepository>,
}

impl LoadUseCase {
    pub fn new(config: Arc<StoreConfig>, repo: Arc<dyn RecordRepository>) -> Self {
        Self { config, repo }
    }

    /// Rebuilds the in-memory index from everything the backend holds.
    pub async fn execute(&self) -> Result<Collection, DomainError> {
        let records = self.repo.get_all().await?;
        for record in &records {
            DomainError::check_dimension(self.config.dimension(), &record.vector)?;
        }
        let collection = Collection::from_records(records);
        info!(
            collection = self.config.name(),
            count = collection.len(),
            "collection loaded"
        );
        Ok(collection)
    }
}
