use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Fails with `DimensionMismatch` unless `vector` has exactly `expected` components.
    pub fn check_dimension(expected: usize, vector: &[f32]) -> Result<(), DomainError> {
        if vector.len() != expected {
            return Err(DomainError::DimensionMismatch {
                expected,
                got: vector.len(),
            });
        }
        Ok(())
    }

    /// Length check plus every component must be finite. NaN and infinities
    /// cannot be scored or written back as JSON numbers.
    pub fn check_vector(expected: usize, vector: &[f32]) -> Result<(), DomainError> {
        Self::check_dimension(expected, vector)?;
        if let Some(i) = vector.iter().position(|x| !x.is_finite()) {
            return Err(DomainError::InvalidInput(format!(
                "vector component {i} is not finite ({})",
                vector[i]
            )));
        }
        Ok(())
    }
}
