use crate::domain::error::DomainError;

/// Fresh identifier for a record added without one.
pub fn generate() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Ids become file names, so they must be a single, non-empty path component.
pub fn validate(id: &str) -> Result<(), DomainError> {
    if id.is_empty() {
        return Err(DomainError::InvalidInput("record id must not be empty".into()));
    }
    if id == "." || id == ".." || id.contains(['/', '\\', '\0']) {
        return Err(DomainError::InvalidInput(format!(
            "record id '{id}' is not a valid file name"
        )));
    }
    Ok(())
}
