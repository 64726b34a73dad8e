//! The `:book_id` path segment.
//!
//! Book ids arrive as raw text and are parsed by the handler, so that an
//! anonymous action can be sent to the login page before a malformed id is
//! rejected. An id that is not a valid integer names no book and answers 404
//! like any other unknown id.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use tracing::debug;

use crate::backend::domain::LibraryError;
use crate::backend::io::rest::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookIdSegment(pub String);

impl BookIdSegment {
    pub fn parse(&self) -> Result<i64, ApiError> {
        self.0.parse::<i64>().map_err(|_| {
            debug!("Malformed book id {:?}", self.0);
            ApiError(LibraryError::not_found("Book", &self.0))
        })
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for BookIdSegment {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<String>::from_request_parts(parts, state).await {
            Ok(Path(raw)) => Ok(BookIdSegment(raw)),
            Err(rejection) => {
                debug!("Unreadable book id: {}", rejection.body_text());
                Err(ApiError(LibraryError::not_found("Book", "")))
            }
        }
    }
}
