//! Domain failures already resolved to a catalog key and a localized message.

use super::{ErrorCode, ErrorResponse};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// An error whose message has been looked up for the caller's locale.
///
/// Domain crates translate their own error enums into this type at the
/// request boundary; the body carries both the catalog key and the text.
#[derive(Debug, Error)]
#[error("{message_key}: {message}")]
pub struct LocalizedError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message_key: String,
    pub message: String,
}

impl LocalizedError {
    pub fn new(
        status: StatusCode,
        code: ErrorCode,
        message_key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            code,
            message_key: message_key.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for LocalizedError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                error_code = self.code.code(),
                message_key = %self.message_key,
                "{}",
                self.message
            );
        } else {
            tracing::info!(
                error_code = self.code.code(),
                message_key = %self.message_key,
                status = self.status.as_u16(),
                "Request rejected"
            );
        }

        let body = Json(ErrorResponse {
            code: self.code.code(),
            error: self.code.as_str().to_string(),
            message_key: Some(self.message_key),
            message: self.message,
            details: None,
        });

        (self.status, body).into_response()
    }
}
