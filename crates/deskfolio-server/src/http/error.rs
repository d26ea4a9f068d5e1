//! Error responses
//!
//! Every failing endpoint answers `{"error": {"code", "message"}}`. Backend
//! faults are logged with their cause but reported to the caller as a bare
//! internal error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use deskfolio_core::Error;

/// Maps core errors onto HTTP responses
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::AuthFailed => StatusCode::UNAUTHORIZED,
            err if err.is_caller_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "Request failed");
        }
        let message = match self.0.code() {
            "Internal" => "internal error".to_string(),
            _ => self.0.to_string(),
        };
        let body = Json(json!({"error": {"code": self.0.code(), "message": message}}));
        (status, body).into_response()
    }
}
