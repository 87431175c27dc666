#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Input did not have the expected shape (wrong JSON type, not an object).
    #[error("Malformed input: {0}")]
    Malformed(String),
}
