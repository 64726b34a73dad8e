//! # Backend Module
//!
//! Library loans server: a book catalogue, student identities and the loans
//! between them.
//!
//! ## Architecture
//!
//! The backend follows a three-layer architecture:
//!
//! - **IO Layer** (`io/`): HTTP endpoints, session cookies, redirects, DTO mapping
//! - **Domain Layer** (`domain/`): loan rules, catalogue queries, identity
//! - **Storage Layer** (`storage/`): SQLite repositories behind async traits
//!
//! Dependencies flow downwards only. Domain services receive their storage
//! at construction and are cheap to clone; [`AppState`] bundles them for the
//! request handlers.

pub mod domain;
pub mod io;
pub mod seed;
pub mod storage;

use anyhow::Result;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::backend::domain::{CatalogService, IdentityService, LoanService, StudentService};
use crate::backend::io::rest::redirects::RedirectPolicy;
use crate::backend::io::rest::{catalog_apis, loan_apis, session_apis};
use crate::backend::seed::{import_seed, SeedData};
use crate::backend::storage::DbConnection;
use crate::config::LibraryConfig;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub catalog_service: CatalogService,
    pub loan_service: LoanService,
    pub identity_service: IdentityService,
    pub student_service: StudentService,
    pub redirect_policy: RedirectPolicy,
}

/// Wire every service to one database connection
pub fn build_state(db: DbConnection, config: &LibraryConfig) -> AppState {
    AppState {
        catalog_service: CatalogService::new(db.clone()),
        loan_service: LoanService::new(db.clone()),
        identity_service: IdentityService::new(db.clone()).with_max_age(config.session_max_age()),
        student_service: StudentService::new(db),
        redirect_policy: RedirectPolicy::new(config.allowed_hosts.clone()),
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &LibraryConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db_conn = DbConnection::new(&config.database_url).await?;

    info!("Setting up domain model");
    let app_state = build_state(db_conn, config);

    if let Some(seed_file) = &config.seed_file {
        info!("Importing seed data from {:?}", seed_file);
        let data = SeedData::from_file(seed_file)?;
        import_seed(data, &app_state.catalog_service, &app_state.student_service).await?;
    }

    Ok(app_state)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .merge(catalog_apis::router())
        .merge(loan_apis::router())
        .merge(session_apis::router())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
