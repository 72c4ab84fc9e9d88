//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// API error type.
///
/// Client-facing messages come from [`ApiError::client_message`]; unexpected
/// failures collapse to a fixed string there so internals never leak.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Not found")]
    NotFound,

    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Server misconfiguration")]
    Misconfiguration,

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Validation(#[from] locker_core::Error),

    #[error("storage error: {0}")]
    Storage(#[from] locker_storage::StorageError),

    #[error("kv error: {0}")]
    Kv(#[from] locker_kv::KvError),
}

impl ApiError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::InvalidPassword => "invalid_password",
            Self::NotFound => "not_found",
            Self::MethodNotAllowed(_) => "method_not_allowed",
            Self::RateLimited => "rate_limited",
            Self::Misconfiguration => "misconfiguration",
            Self::Internal(_) => "internal_error",
            Self::Validation(_) => "validation_error",
            Self::Storage(_) => "storage_error",
            Self::Kv(_) => "kv_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized | Self::InvalidPassword => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Storage(locker_storage::StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Misconfiguration | Self::Internal(_) | Self::Storage(_) | Self::Kv(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message exposed in the response body.
    fn client_message(&self) -> String {
        match self {
            Self::Storage(locker_storage::StorageError::NotFound(_)) => "Not found".to_string(),
            Self::Internal(_) | Self::Storage(_) | Self::Kv(_) => {
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Error body shape shared by every failing response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        }
        let body = ErrorBody {
            success: false,
            error: self.client_message(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
