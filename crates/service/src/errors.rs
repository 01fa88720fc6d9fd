use thiserror::Error;

use models::ValidationError;

use crate::car::repository::RepositoryError;

/// Stable error codes shared with the HTTP layer.
pub mod codes {
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const INVALID_REQUEST_BODY: &str = "INVALID_REQUEST_BODY";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const CAR_NOT_FOUND: &str = "CAR_NOT_FOUND";
    pub const ID_NOT_ALLOWED_ON_CREATE: &str = "ID_NOT_ALLOWED_ON_CREATE";
    pub const BODY_ID_MISMATCH: &str = "BODY_ID_MISMATCH";
    pub const ID_REQUIRED: &str = "ID_REQUIRED";
    pub const INVALID_CAR_PATH: &str = "INVALID_CAR_PATH";
    pub const METHOD_NOT_ALLOWED: &str = "METHOD_NOT_ALLOWED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("car not found: {0}")]
    CarNotFound(String),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::CarNotFound(_) => codes::CAR_NOT_FOUND,
            ServiceError::Validation(_) => codes::VALIDATION_FAILED,
            ServiceError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// HTTP status the error surfaces as.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::CarNotFound(_) => 404,
            ServiceError::Validation(_) => 400,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Fixed, client-facing message for the code.
    pub fn message(&self) -> &'static str {
        match self {
            ServiceError::CarNotFound(_) => "Car not found",
            ServiceError::Validation(_) => "Validation failed",
            ServiceError::Internal(_) => "Internal server error",
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(id) => ServiceError::CarNotFound(id),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}
