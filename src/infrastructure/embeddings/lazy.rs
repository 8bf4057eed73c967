use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

type InitFuture = Pin<Box<dyn Future<Output = Result<Arc<dyn EmbeddingProvider>, DomainError>> + Send>>;

/// Defers building an expensive provider until the first embed call, then
/// reuses it for every later call.
///
/// Concurrent first calls wait on the same initialisation. A failed
/// initialisation is not cached; the next call tries again.
pub struct LazyProvider {
    cell: OnceCell<Arc<dyn EmbeddingProvider>>,
    init: Box<dyn Fn() -> InitFuture + Send + Sync>,
    dimension: Option<usize>,
}

impl LazyProvider {
    pub fn new<F, Fut>(dimension: Option<usize>, init: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Arc<dyn EmbeddingProvider>, DomainError>> + Send + 'static,
    {
        Self {
            cell: OnceCell::new(),
            init: Box::new(move || -> InitFuture { Box::pin(init()) }),
            dimension,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    async fn provider(&self) -> Result<&Arc<dyn EmbeddingProvider>, DomainError> {
        self.cell
            .get_or_try_init(|| async {
                let provider = (self.init)().await?;
                info!(dimension = ?provider.dimension(), "embedding provider initialized");
                Ok::<_, DomainError>(provider)
            })
            .await
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for LazyProvider {
    async fn embed(&self, texts: &[String], input_type: InputType) -> Result<Vec<Vec<f32>>, DomainError> {
        self.provider().await?.embed(texts, input_type).await
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
            .or_else(|| self.cell.get().and_then(|p| p.dimension()))
    }
}
