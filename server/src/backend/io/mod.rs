//! # IO Module
//!
//! Adapter layer between HTTP clients and the domain logic.
//!
//! Requests are decoded here, turned into domain commands and queries, and the
//! results are mapped back to the JSON DTOs of the `shared` crate. Actions that
//! change state (borrow, return, login, logout) answer with a `303 See Other`
//! redirect and queue a one-shot status message on the visitor's session.
//!
//! ## Endpoints
//!
//! - **GET /**: catalogue, optional `sort`
//! - **GET /search**: catalogue filtered by `q`
//! - **GET /books/{id}**: book detail with the viewer's active loan
//! - **GET|POST /login**, **POST /logout**
//! - **POST /books/{id}/borrow**, **POST /books/{id}/return**
//! - **GET /health**

pub mod rest;

pub use rest::*;
