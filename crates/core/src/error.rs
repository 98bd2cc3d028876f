#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid wire format: {0}")]
    Format(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
