use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Unified API error type for consistent error responses
pub struct ApiError {
    pub status: StatusCode,
    detail: Detail,
}

enum Detail {
    Message(String),
    Fields(BTreeMap<String, String>),
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            detail: Detail::Message(message.into()),
        }
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "the server encountered a problem and could not process your request",
        )
    }

    pub fn not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "the requested resource could not be found",
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// 422 carrying the full field-to-message map, never a partial one.
    pub fn failed_validation(errors: BTreeMap<String, String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: Detail::Fields(errors),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.detail {
            Detail::Message(message) => json!({ "error": message }),
            Detail::Fields(fields) => json!({ "error": fields }),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Convert from core service errors to API errors. Storage detail is logged
/// server-side and never reaches the client body.
impl From<screenlog_core::Error> for ApiError {
    fn from(err: screenlog_core::Error) -> Self {
        match err {
            screenlog_core::Error::NotFound => Self::not_found(),
            screenlog_core::Error::EditConflict => Self::conflict(
                "unable to update the record because it was modified concurrently, please try again",
            ),
            screenlog_core::Error::Database(e) => {
                tracing::error!(error = %e, "database failure");
                Self::internal()
            }
        }
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
