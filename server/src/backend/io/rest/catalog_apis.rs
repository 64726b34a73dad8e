//! # REST API for the Book Catalogue
//!
//! Read-only views: catalogue, search and book detail. Every view drains the
//! visitor's queued status messages into its response.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::backend::domain::commands::catalog::{BookListQuery, BookSearchQuery};
use crate::backend::io::rest::book_id::BookIdSegment;
use crate::backend::io::rest::mappers::{BookMapper, StudentMapper};
use crate::backend::io::rest::session::SessionContext;
use crate::backend::io::rest::ApiError;
use crate::backend::AppState;
use shared::{BookDetailResponse, BookListResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_books))
        .route("/search", get(search_books))
        .route("/books/:book_id", get(book_detail))
        .route("/health", get(health))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub sort: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Whole catalogue, ordered by `sort` (title, author or year)
pub async fn list_books(
    State(state): State<AppState>,
    session: SessionContext,
    Query(params): Query<ListParams>,
) -> Result<Json<BookListResponse>, ApiError> {
    info!("GET / - sort: {:?}", params.sort);

    let result = state
        .catalog_service
        .list_books(BookListQuery { sort: params.sort })
        .await?;
    let messages = state.identity_service.take_messages(session.token.as_deref()).await?;

    Ok(Json(BookMapper::to_list_response(
        result,
        session.student.map(StudentMapper::to_dto),
        messages,
    )))
}

pub async fn search_books(
    State(state): State<AppState>,
    session: SessionContext,
    Query(params): Query<SearchParams>,
) -> Result<Json<BookListResponse>, ApiError> {
    info!("GET /search - q: {:?}", params.q);

    let result = state
        .catalog_service
        .search_books(BookSearchQuery { query: params.q })
        .await?;
    let messages = state.identity_service.take_messages(session.token.as_deref()).await?;

    Ok(Json(BookMapper::to_list_response(
        result,
        session.student.map(StudentMapper::to_dto),
        messages,
    )))
}

pub async fn book_detail(
    State(state): State<AppState>,
    session: SessionContext,
    segment: BookIdSegment,
) -> Result<Json<BookDetailResponse>, ApiError> {
    info!("GET /books/{}", segment.0);
    let book_id = segment.parse()?;

    let result = state
        .catalog_service
        .book_detail(book_id, session.student.as_ref())
        .await?;
    let messages = state.identity_service.take_messages(session.token.as_deref()).await?;

    Ok(Json(BookMapper::to_detail_response(
        result,
        session.student.map(StudentMapper::to_dto),
        messages,
    )))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
