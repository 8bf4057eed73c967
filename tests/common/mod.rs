//! Shared test helpers.
#![allow(dead_code)]

use embedstore::domain::entities::record::Record;
use embedstore::domain::error::DomainError;
use embedstore::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use embedstore::domain::ports::record_repository::RecordRepository;
use embedstore::domain::values::config::StoreConfig;
use embedstore::infrastructure::embeddings::hashing::HashingProvider;
use embedstore::infrastructure::filesystem::json_repo::JsonFileRepository;
use embedstore::EmbedStore;
use std::path::Path;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const DIM: usize = 64;

pub fn config(root: &Path, name: &str, dimension: usize) -> StoreConfig {
    StoreConfig::new(name, dimension).unwrap().with_directory(root)
}

pub fn hashing(dimension: usize) -> Arc<dyn EmbeddingProvider> {
    Arc::new(HashingProvider::new(dimension).unwrap())
}

pub async fn open(root: &Path, name: &str) -> EmbedStore {
    EmbedStore::open(config(root, name, DIM), hashing(DIM)).await.unwrap()
}

/// JSON-file repository that can fail or stall writes on demand.
pub struct FlakyRepository {
    inner: JsonFileRepository,
    /// Successful puts left before one put fails; negative means never.
    puts_left: AtomicI64,
    /// Records `delete_all` removes before it fails; `None` means it succeeds.
    fail_delete_all: Option<usize>,
    put_delay: Duration,
    delete_delay: Duration,
}

impl FlakyRepository {
    pub fn new(dir: &Path) -> Self {
        Self {
            inner: JsonFileRepository::new(dir),
            puts_left: AtomicI64::new(-1),
            fail_delete_all: None,
            put_delay: Duration::ZERO,
            delete_delay: Duration::ZERO,
        }
    }

    pub fn failing_after(self, puts: i64) -> Self {
        self.puts_left.store(puts, Ordering::SeqCst);
        self
    }

    pub fn failing_delete_all(mut self) -> Self {
        self.fail_delete_all = Some(1);
        self
    }

    /// `delete_all` fails without touching any record.
    pub fn rejecting_delete_all(mut self) -> Self {
        self.fail_delete_all = Some(0);
        self
    }

    /// Stalls `delete` and `delete_all` before they touch the disk.
    pub fn with_delete_delay(mut self, delay: Duration) -> Self {
        self.delete_delay = delay;
        self
    }

    pub fn with_put_delay(mut self, delay: Duration) -> Self {
        self.put_delay = delay;
        self
    }
}

#[async_trait::async_trait]
impl RecordRepository for FlakyRepository {
    async fn put(&self, record: &Record) -> Result<(), DomainError> {
        if !self.put_delay.is_zero() {
            tokio::time::sleep(self.put_delay).await;
        }
        let left = self.puts_left.load(Ordering::SeqCst);
        if left == 0 {
            self.puts_left.store(-1, Ordering::SeqCst);
            return Err(DomainError::Storage("disk full".into()));
        }
        if left > 0 {
            self.puts_left.fetch_sub(1, Ordering::SeqCst);
        }
        self.inner.put(record).await
    }

    async fn get_all(&self) -> Result<Vec<Record>, DomainError> {
        self.inner.get_all().await
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        if !self.delete_delay.is_zero() {
            tokio::time::sleep(self.delete_delay).await;
        }
        self.inner.delete(id).await
    }

    async fn delete_all(&self) -> Result<(), DomainError> {
        if !self.delete_delay.is_zero() {
            tokio::time::sleep(self.delete_delay).await;
        }
        if let Some(removed) = self.fail_delete_all {
            for record in self.inner.get_all().await?.iter().take(removed) {
                self.inner.delete(&record.id).await?;
            }
            return Err(DomainError::Storage("permission denied".into()));
        }
        self.inner.delete_all().await
    }
}

/// Wraps a provider, counting calls and optionally stalling each one.
pub struct CountingProvider {
    inner: Arc<dyn EmbeddingProvider>,
    pub calls: AtomicUsize,
    delay: Duration,
}

impl CountingProvider {
    pub fn new(inner: Arc<dyn EmbeddingProvider>, delay: Duration) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            delay,
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for CountingProvider {
    async fn embed(&self, texts: &[String], input_type: InputType) -> Result<Vec<Vec<f32>>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.embed(texts, input_type).await
    }

    fn dimension(&self) -> Option<usize> {
        self.inner.dimension()
    }
}

/// Returns a wrong-length vector for any text containing "poison".
pub struct PoisonProvider {
    inner: HashingProvider,
}

impl PoisonProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            inner: HashingProvider::new(dimension).unwrap(),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for PoisonProvider {
    async fn embed(&self, texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f32>>, DomainError> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = self.inner.embed_text(t);
                if t.contains("poison") {
                    v.push(0.0);
                }
                v
            })
            .collect())
    }

    fn dimension(&self) -> Option<usize> {
        self.inner.dimension()
    }
}

/// Emits NaN in the first component for any text containing "nan".
pub struct NanProvider {
    inner: HashingProvider,
}

impl NanProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            inner: HashingProvider::new(dimension).unwrap(),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for NanProvider {
    async fn embed(&self, texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f32>>, DomainError> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = self.inner.embed_text(t);
                if t.contains("nan") {
                    v[0] = f32::NAN;
                }
                v
            })
            .collect())
    }

    fn dimension(&self) -> Option<usize> {
        self.inner.dimension()
    }
}

pub fn record_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".json"))
            .collect(),
        Err(_) => vec![],
    };
    names.sort();
    names
}
