pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

use crate::application::add_document::AddDocumentUseCase;
use crate::application::documents::DocumentsUseCase;
use crate::application::load::LoadUseCase;
use crate::application::reset::ResetUseCase;
use crate::application::search::SearchUseCase;
use crate::domain::entities::record::Record;
use crate::domain::entities::search_hit::SearchHit;
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::domain::ports::record_repository::RecordRepository;
use crate::domain::values::config::StoreConfig;
use crate::infrastructure::embeddings::hashing::HashingProvider;
use crate::infrastructure::embeddings::lazy::LazyProvider;
use crate::infrastructure::embeddings::openai::{self, OpenAiProvider};
use crate::infrastructure::embeddings::voyage::{self, VoyageProvider};
use crate::infrastructure::filesystem::json_repo::JsonFileRepository;
use crate::infrastructure::sqlite::record_repo::SqliteRecordRepository;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// A collection of embedded documents backed by durable storage.
///
/// All clones of the inner handles share one index, so operations on a
/// single `EmbedStore` are consistent with each other. Separate instances
/// opened on the same `(name, storage_root)` share files but not locks.
pub struct EmbedStore {
    config: Arc<StoreConfig>,
    add_document_uc: AddDocumentUseCase,
    search_uc: SearchUseCase,
    reset_uc: ResetUseCase,
    documents_uc: DocumentsUseCase,
}

impl EmbedStore {
    /// Opens the collection with the provider and backend named by
    /// `EMBEDSTORE_EMBEDDING_PROVIDER` and `EMBEDSTORE_BACKEND`.
    pub async fn from_env(config: StoreConfig) -> Result<Self, DomainError> {
        let provider = std::env::var("EMBEDSTORE_EMBEDDING_PROVIDER").unwrap_or_else(|_| "hashing".into());
        let api_key = std::env::var("EMBEDSTORE_EMBEDDING_API_KEY").unwrap_or_default();
        let model = std::env::var("EMBEDSTORE_EMBEDDING_MODEL").ok();

        let embedder: Arc<dyn EmbeddingProvider> = match provider.as_str() {
            "hashing" => Arc::new(HashingProvider::new(config.dimension())?),
            other => http_provider(other, api_key, model)?,
        };

        let backend = std::env::var("EMBEDSTORE_BACKEND").unwrap_or_else(|_| "json".into());
        let repo: Arc<dyn RecordRepository> = match backend.as_str() {
            "json" => Arc::new(JsonFileRepository::for_config(&config)),
            "sqlite" => Arc::new(SqliteRecordRepository::for_config(&config)?),
            other => {
                return Err(DomainError::InvalidConfiguration(format!("Unknown backend: {other}")))
            }
        };

        Self::with_repository(config, embedder, repo).await
    }

    /// Opens the collection with the default JSON-file backend.
    pub async fn open(config: StoreConfig, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self, DomainError> {
        let repo: Arc<dyn RecordRepository> = Arc::new(JsonFileRepository::for_config(&config));
        Self::with_repository(config, embedder, repo).await
    }

    pub async fn with_repository(
        config: StoreConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        repo: Arc<dyn RecordRepository>,
    ) -> Result<Self, DomainError> {
        let config = Arc::new(config);

        if let Some(provider_dim) = embedder.dimension() {
            if provider_dim != config.dimension() {
                warn!(
                    collection = config.name(),
                    expected = config.dimension(),
                    provider = provider_dim,
                    "embedding provider dimension differs from store; adds and searches will fail"
                );
            }
        }

        let collection = LoadUseCase::new(config.clone(), repo.clone()).execute().await?;
        let index = Arc::new(RwLock::new(collection));

        Ok(Self {
            add_document_uc: AddDocumentUseCase::new(config.clone(), embedder.clone(), repo.clone(), index.clone()),
            search_uc: SearchUseCase::new(config.clone(), embedder, index.clone()),
            reset_uc: ResetUseCase::new(config.clone(), repo.clone(), index.clone()),
            documents_uc: DocumentsUseCase::new(repo, index),
            config,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // Delegating methods
    pub async fn add_document(&self, text: &str, id: Option<&str>) -> Result<String, DomainError> {
        self.add_document_uc
            .execute(text.to_string(), id.map(str::to_string))
            .await
    }

    pub async fn add_documents(&self, texts: &[String]) -> Result<Vec<String>, DomainError> {
        let items = texts.iter().map(|t| (t.clone(), None)).collect();
        self.add_document_uc.execute_batch(items).await
    }

    pub async fn add_documents_with_ids(
        &self,
        items: Vec<(String, Option<String>)>,
    ) -> Result<Vec<String>, DomainError> {
        self.add_document_uc.execute_batch(items).await
    }

    pub async fn search(
        &self,
        query: &str,
        threshold: Option<f64>,
        num_results: Option<usize>,
    ) -> Result<Vec<SearchHit>, DomainError> {
        self.search_uc.execute(query, threshold, num_results).await
    }

    pub async fn search_by_vector(
        &self,
        vector: &[f32],
        threshold: Option<f64>,
        num_results: Option<usize>,
    ) -> Result<Vec<SearchHit>, DomainError> {
        self.search_uc.search_by_vector(vector, threshold, num_results).await
    }

    pub async fn reset(&self) -> Result<(), DomainError> {
        self.reset_uc.execute().await
    }

    pub async fn get_document(&self, id: &str) -> Result<Record, DomainError> {
        self.documents_uc.get(id).await
    }

    pub async fn delete_document(&self, id: &str) -> Result<(), DomainError> {
        self.documents_uc.delete(id).await
    }

    pub async fn list_ids(&self) -> Vec<String> {
        self.documents_uc.list_ids().await
    }

    pub async fn len(&self) -> usize {
        self.documents_uc.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.documents_uc.is_empty().await
    }
}

/// HTTP providers build their client on first use and keep it afterwards.
/// The model table supplies the dimension up front so a mismatch can be
/// reported at open.
fn http_provider(
    kind: &str,
    api_key: String,
    model: Option<String>,
) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
    match kind {
        "openai" => {
            let dimension = OpenAiProvider::model_dimension(model.as_deref().unwrap_or(openai::DEFAULT_MODEL));
            Ok(lazy_provider(dimension, move || {
                OpenAiProvider::new(api_key.clone(), model.clone(), None)
            }))
        }
        "voyage" => {
            let dimension = VoyageProvider::model_dimension(model.as_deref().unwrap_or(voyage::DEFAULT_MODEL));
            Ok(lazy_provider(dimension, move || {
                VoyageProvider::new(api_key.clone(), model.clone(), None)
            }))
        }
        other => Err(DomainError::InvalidConfiguration(format!(
            "Unknown embedding provider: {other}"
        ))),
    }
}

fn lazy_provider<P, F>(dimension: Option<usize>, build: F) -> Arc<dyn EmbeddingProvider>
where
    P: EmbeddingProvider + 'static,
    F: Fn() -> P + Send + Sync + 'static,
{
    Arc::new(LazyProvider::new(dimension, move || {
        let provider: Arc<dyn EmbeddingProvider> = Arc::new(build());
        async move { Ok::<_, DomainError>(provider) }
    }))
}
