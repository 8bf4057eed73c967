use crate::application::{run_commit, SharedCollection};
use crate::domain::entities::collection::Collection;
use crate::domain::entities::record::Record;
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use crate::domain::ports::record_repository::RecordRepository;
use crate::domain::values::config::StoreConfig;
use crate::domain::values::record_id;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OwnedRwLockWriteGuard;
use tracing::{error, info, warn};

pub struct AddDocumentUseCase {
    config: Arc<StoreConfig>,
    embedder: Arc<dyn EmbeddingProvider>,
    repo: Arc<dyn RecordRepository>,
    index: SharedCollection,
}

/// A validated document waiting to be committed.
struct Pending {
    id: String,
    text: String,
    vector: Vec<f32>,
}

impl AddDocumentUseCase {
    pub fn new(
        config: Arc<StoreConfig>,
        embedder: Arc<dyn EmbeddingProvider>,
        repo: Arc<dyn RecordRepository>,
        index: SharedCollection,
    ) -> Self {
        Self {
            config,
            embedder,
            repo,
            index,
        }
    }

    pub async fn execute(&self, text: String, id: Option<String>) -> Result<String, DomainError> {
        let mut ids = self.execute_batch(vec![(text, id)]).await?;
        ids.pop()
            .ok_or_else(|| DomainError::Storage("commit returned no id".into()))
    }

    /// Adds every `(text, id)` pair or none of them. Returned ids follow input
    /// order; an id repeated within the batch resolves to its last text.
    pub async fn execute_batch(&self, items: Vec<(String, Option<String>)>) -> Result<Vec<String>, DomainError> {
        if items.is_empty() {
            return Ok(vec![]);
        }
        for id in items.iter().filter_map(|(_, id)| id.as_deref()) {
            record_id::validate(id)?;
        }

        let texts: Vec<String> = items.iter().map(|(text, _)| text.clone()).collect();
        let vectors = self.embedder.embed(&texts, InputType::Document).await?;
        if vectors.len() != texts.len() {
            return Err(DomainError::Embedding(format!(
                "provider returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )));
        }
        for vector in &vectors {
            DomainError::check_vector(self.config.dimension(), vector)?;
        }

        let pending: Vec<Pending> = items
            .into_iter()
            .zip(vectors)
            .map(|((text, id), vector)| Pending {
                id: id.unwrap_or_else(record_id::generate),
                text,
                vector,
            })
            .collect();
        let ids: Vec<String> = pending.iter().map(|p| p.id.clone()).collect();

        let guard = self.index.clone().write_owned().await;
        let repo = self.repo.clone();
        let collection = self.config.name().to_string();
        let count = run_commit(commit(guard, repo, pending)).await?;
        info!(collection = %collection, count, "documents added");
        Ok(ids)
    }
}

/// Persists `pending` then indexes it. On a backend failure the records
/// already written by this batch are restored to their prior state and the
/// index is left untouched.
async fn commit(
    mut index: OwnedRwLockWriteGuard<Collection>,
    repo: Arc<dyn RecordRepository>,
    pending: Vec<Pending>,
) -> Result<usize, DomainError> {
    let staged = stage(&index, pending);

    for (written, record) in staged.iter().enumerate() {
        if let Err(e) = repo.put(record).await {
            warn!(id = %record.id, error = %e, "write failed, rolling back batch");
            rollback(&index, repo.as_ref(), &staged[..written]).await;
            return Err(e);
        }
    }

    let count = staged.len();
    for record in staged {
        index.upsert(record);
    }
    Ok(count)
}

/// Builds the final records: overwrites keep their original creation time,
/// new ids get strictly increasing ones, duplicates within the batch collapse.
fn stage(index: &Collection, pending: Vec<Pending>) -> Vec<Record> {
    let mut staged: Vec<Record> = Vec::with_capacity(pending.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut floor = None;

    for p in pending {
        if let Some(&pos) = positions.get(&p.id) {
            staged[pos] = staged[pos].overwritten_by(p.text, p.vector);
            continue;
        }
        let record = match index.get(&p.id) {
            Some(existing) => existing.overwritten_by(p.text, p.vector),
            None => {
                let created = index.next_created_at(floor);
                floor = Some(created);
                Record::new(p.id, p.text, p.vector, created)
            }
        };
        positions.insert(record.id.clone(), staged.len());
        staged.push(record);
    }
    staged
}

async fn rollback(index: &Collection, repo: &dyn RecordRepository, written: &[Record]) {
    for record in written.iter().rev() {
        let restored = match index.get(&record.id) {
            Some(previous) => repo.put(previous).await,
            None => repo.delete(&record.id).await.map(|_| ()),
        };
        if let Err(e) = restored {
            error!(id = %record.id, error = %e, "rollback failed; durable state may diverge");
        }
    }
}
