//! # REST API Interface Layer
//!
//! HTTP endpoints of the library server. This layer handles:
//! - Query string and form decoding
//! - Session cookie extraction into an explicit [`session::SessionContext`]
//! - Translating domain outcomes into redirects and flash messages
//! - Translating domain errors into HTTP status codes with a JSON body
//!
//! No business rule lives here; every decision is delegated to the domain
//! services held in [`AppState`](crate::backend::AppState).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;
use tracing::error;

use crate::backend::domain::LibraryError;

// Module declarations
pub mod book_id;
pub mod catalog_apis;
pub mod loan_apis;
pub mod mappers;
pub mod redirects;
pub mod session;
pub mod session_apis;

/// Error returned by handlers; renders as `{"error": ..., "code": ...}`
#[derive(Debug)]
pub struct ApiError(pub LibraryError);

impl From<LibraryError> for ApiError {
    fn from(e: LibraryError) -> Self {
        ApiError(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError(LibraryError::Storage(e))
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            LibraryError::Validation(_) => (StatusCode::CONFLICT, "VALIDATION_ERROR"),
            LibraryError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            LibraryError::StudentNotFound(_) => (StatusCode::NOT_FOUND, "STUDENT_NOT_FOUND"),
            LibraryError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            LibraryError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self.0 {
            LibraryError::Storage(e) => {
                error!("Internal error: {:?}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
