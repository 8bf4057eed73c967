use crate::application::load::LoadUseCase;
use crate::application::{run_commit, SharedCollection};
use crate::domain::error::DomainError;
use crate::domain::ports::record_repository::RecordRepository;
use crate::domain::values::config::StoreConfig;
use std::sync::Arc;
use tracing::{error, info};

pub struct ResetUseCase {
    config: Arc<StoreConfig>,
    repo: Arc<dyn RecordRepository>,
    index: SharedCollection,
}

impl ResetUseCase {
    pub fn new(config: Arc<StoreConfig>, repo: Arc<dyn RecordRepository>, index: SharedCollection) -> Self {
        Self { config, repo, index }
    }

    /// Deletes every durable record and empties the index. If the backend
    /// fails part-way the index is reloaded so it still mirrors storage; a
    /// reload that fails validation keeps the previous index.
    pub async fn execute(&self) -> Result<(), DomainError> {
        let mut index = self.index.clone().write_owned().await;
        let repo = self.repo.clone();
        let config = self.config.clone();
        let collection = config.name().to_string();

        run_commit(async move {
            let deleted = repo.delete_all().await;
            match deleted {
                Ok(()) => {
                    let removed = index.len();
                    index.clear();
                    info!(collection = %collection, removed, "collection reset");
                    Ok(())
                }
                Err(e) => {
                    match LoadUseCase::new(config, repo).execute().await {
                        Ok(reloaded) => *index = reloaded,
                        Err(reload) => {
                            error!(collection = %collection, error = %reload, "could not resync index after failed reset")
                        }
                    }
                    Err(e)
                }
            }
        })
        .await
    }
}
