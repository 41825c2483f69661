//! # Error Handling Middleware
//!
//! Maps domain-specific errors to HTTP status codes and JSON error
//! responses, so every handler resolves to either a success payload or a
//! clear error body. Schedule validation failures carry their per-field
//! messages so the client can mark the offending input.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use speakmatch_core::errors::SpeakError;

/// Application error wrapper that provides HTTP status code mapping.
///
/// `AppError` wraps domain-specific `SpeakError` instances and implements
/// `IntoResponse` to convert them into HTTP responses with appropriate
/// status codes and JSON payloads.
#[derive(Debug)]
pub struct AppError(pub SpeakError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map error types to HTTP status codes
        let status = match &self.0 {
            SpeakError::NotFound(_) => StatusCode::NOT_FOUND,
            SpeakError::Validation(_) => StatusCode::BAD_REQUEST,
            SpeakError::Schedule(_) => StatusCode::BAD_REQUEST,
            SpeakError::Capacity(_) => StatusCode::CONFLICT,
            SpeakError::Conflict(_) => StatusCode::CONFLICT,
            SpeakError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SpeakError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Schedule errors carry separate date/time field messages
        let body = match &self.0 {
            SpeakError::Schedule(fields) => Json(json!({
                "error": self.0.to_string(),
                "fields": fields,
            })),
            _ => Json(json!({ "error": self.0.to_string() })),
        };

        (status, body).into_response()
    }
}

/// Automatic conversion from SpeakError to AppError, so `?` works in
/// handlers returning `Result<T, AppError>`.
impl From<SpeakError> for AppError {
    fn from(err: SpeakError) -> Self {
        AppError(err)
    }
}

/// Automatic conversion from eyre::Report to AppError, wrapping the report
/// in a `SpeakError::Database` variant.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(SpeakError::Database(err))
    }
}

/// Maps a SpeakError to an HTTP response.
pub fn map_error(err: SpeakError) -> Response {
    AppError(err).into_response()
}
