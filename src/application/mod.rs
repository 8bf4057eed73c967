pub mod add_document;
pub mod documents;
pub mod load;
pub mod reset;
pub mod search;

use crate::domain::entities::collection::Collection;
use crate::domain::error::DomainError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The in-memory index shared by every use case of one store instance.
pub type SharedCollection = Arc<RwLock<Collection>>;

/// Runs a commit to completion even if the caller's future is dropped.
///
/// Callers pass in an owned write guard, so the index stays locked until the
/// spawned commit has updated both the backend and the index.
pub(crate) async fn run_commit<T, F>(commit: F) -> Result<T, DomainError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, DomainError>> + Send + 'static,
{
    tokio::spawn(commit)
        .await
        .map_err(|e| DomainError::Storage(format!("Commit task failed: {e}")))?
}
