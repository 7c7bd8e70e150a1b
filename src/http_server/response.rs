//! # Response Formatting
//!
//! Error and confirmation payloads for the REST boundary. Domain errors
//! cross into HTTP here and nowhere else: the severity class picks the
//! status code, the stable error code rides in the body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::document::DocumentError;

/// Domain error adapted to an HTTP response
#[derive(Debug)]
pub struct ApiError(pub DocumentError);

impl From<DocumentError> for ApiError {
    fn from(e: DocumentError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Store internals stay out of response bodies.
        let message = match &self.0 {
            DocumentError::Store(_) => "Internal store failure".to_string(),
            other => other.to_string(),
        };

        let body = json!({
            "error": {
                "code": self.0.code(),
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Confirmation response for mutations without an entity body
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
