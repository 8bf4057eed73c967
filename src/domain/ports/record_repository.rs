use crate::domain::entities::record::Record;
use crate::domain::error::DomainError;

/// Durable mirror of one collection.
///
/// `put` must replace any existing record with the same id atomically: a
/// concurrent `get_all` sees either the old or the new record, never a mix.
#[async_trait::async_trait]
pub trait RecordRepository: Send + Sync {
    async fn put(&self, record: &Record) -> Result<(), DomainError>;
    async fn get_all(&self) -> Result<Vec<Record>, DomainError>;
    /// Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;
    async fn delete_all(&self) -> Result<(), DomainError>;
}
