//! HTTP error and success bodies

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use tracing::debug;

use crate::TwiqError;

static DEBUG_ERRORS: AtomicBool = AtomicBool::new(false);

/// Include the underlying error text in error bodies
pub fn set_debug_errors(enabled: bool) {
    DEBUG_ERRORS.store(enabled, Ordering::Relaxed);
}

fn debug_errors() -> bool {
    DEBUG_ERRORS.load(Ordering::Relaxed)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody {
    status: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug_error: Option<String>,
}

/// An error response: status, client-facing message and optional cause
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    cause: Option<String>,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            cause: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 500 with the "Database error: " prefix for store failures
    ///
    /// Domain errors raised by the store keep their own status and message.
    pub fn database(message: &str, err: TwiqError) -> Self {
        match err {
            TwiqError::Validation(_)
            | TwiqError::NotFound(_)
            | TwiqError::OutOfStock(_)
            | TwiqError::Unauthorized(_) => err.into(),
            other => Self::internal(format!("Database error: {message}")).caused_by(&other),
        }
    }

    #[must_use]
    pub fn caused_by(mut self, err: &impl std::fmt::Display) -> Self {
        self.cause = Some(err.to_string());
        self
    }
}

impl From<TwiqError> for ApiError {
    fn from(err: TwiqError) -> Self {
        let status = match &err {
            TwiqError::Validation(_) => StatusCode::BAD_REQUEST,
            TwiqError::NotFound(_) | TwiqError::Database(sqlx::Error::RowNotFound) => {
                StatusCode::NOT_FOUND
            }
            TwiqError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            TwiqError::OutOfStock(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
            cause: Some(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!("Http error {}: {}", self.status.as_u16(), self.message);
        let body = ErrorBody {
            status: self.status.as_u16(),
            message: self.message,
            debug_error: if debug_errors() {
                Some(self.cause.unwrap_or_else(|| "nil".to_string()))
            } else {
                None
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// `Status 200; Message {msg};`
pub fn message(msg: &str) -> String {
    format!("Status 200; Message {msg};")
}
