use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use service::errors::{codes, ServiceError};
use thiserror::Error;
use tracing::{debug, error};

/// Error body: `{"code": ..., "message": ..., "details": ...}`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Structured HTTP error: status, stable code, fixed message and an optional
/// client-visible detail. `cause` is logged, never sent.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: &'static str,
    pub details: Option<String>,
    pub cause: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: &'static str, details: Option<String>) -> Self {
        Self { status, code, message, details, cause: None }
    }

    pub fn internal(cause: impl Into<String>) -> Self {
        Self {
            cause: Some(cause.into()),
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL_ERROR, "Internal server error", None)
        }
    }

    pub fn invalid_body(details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::INVALID_REQUEST_BODY, "Invalid request body", Some(details.into()))
    }

    pub fn validation(details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::VALIDATION_FAILED, "Validation failed", Some(details.into()))
    }

    pub fn id_not_allowed_on_create() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            codes::ID_NOT_ALLOWED_ON_CREATE,
            "ID is not allowed on create",
            Some("id is assigned by the server".into()),
        )
    }

    pub fn body_id_mismatch(path_id: &str, body_id: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            codes::BODY_ID_MISMATCH,
            "Body ID does not match path ID",
            Some(format!("path id {path_id:?}, body id {body_id:?}")),
        )
    }

    pub fn id_required() -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::ID_REQUIRED, "ID is required", None)
    }

    pub fn invalid_car_path(id: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_CAR_PATH,
            "Invalid car path",
            Some(format!("id {id:?} may only contain letters, digits and '-'")),
        )
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, codes::METHOD_NOT_ALLOWED, "Method not allowed", None)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, "Resource not found", None)
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match &e {
            ServiceError::Validation(v) => Self::new(status, e.code(), e.message(), Some(v.reason.to_string())),
            ServiceError::CarNotFound(id) => Self::new(status, e.code(), e.message(), Some(format!("no car with id {id:?}"))),
            ServiceError::Internal(cause) => Self::internal(cause.as_str()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, code = self.code, cause = ?self.cause, "request failed");
        } else {
            debug!(status = %self.status, code = self.code, details = ?self.details, "request rejected");
        }
        let body = ErrorEnvelope { code: self.code, message: self.message, details: self.details };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
