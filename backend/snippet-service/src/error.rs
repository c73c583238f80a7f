/// Error types for snippet-service
use crate::store::StoreError;
use thiserror::Error;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or missing input, caught before any store call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Store operation rejected, or network/timeout failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// An operation that requires an existing document found nothing.
    /// Plain read paths return `Ok(None)` instead.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Acting user is not allowed to perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingDocument { collection, id } => {
                AppError::NotFound(format!("{}/{} does not exist", collection, id))
            }
            StoreError::Backend(msg) => AppError::Persistence(msg),
        }
    }
}
