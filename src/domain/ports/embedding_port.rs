use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Document,
    Query,
}

/// Turns text into fixed-length vectors.
///
/// Implementations are shared behind an `Arc` by every store that uses them,
/// so they must be cheap to call repeatedly and safe to call concurrently.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns exactly one vector per input text, in input order.
    async fn embed(&self, texts: &[String], input_type: InputType) -> Result<Vec<Vec<f32>>, DomainError>;

    /// Length of the vectors this provider produces, when known up front.
    fn dimension(&self) -> Option<usize>;
}

/// Embeds a single text, checking the provider kept its one-vector-per-text promise.
pub async fn embed_one(
    provider: &dyn EmbeddingProvider,
    text: &str,
    input_type: InputType,
) -> Result<Vec<f32>, DomainError> {
    let mut vectors = provider.embed(&[text.to_string()], input_type).await?;
    match vectors.len() {
        1 => Ok(vectors.remove(0)),
        n => Err(DomainError::Embedding(format!("provider returned {n} vectors for 1 text"))),
    }
}
