//! # Storage Module
//!
//! Handles all data persistence for the library server.
//!
//! The domain layer talks to the traits in [`traits`]; the SQLite repositories
//! implement them on top of a shared [`DbConnection`] pool.
//!
//! ## Key Responsibilities
//!
//! - **Schema Setup**: Creating the books, students, loans and sessions tables
//! - **Data Retrieval**: Lookups, catalogue ordering and search
//! - **Transaction Safety**: Loan open/close run as one transaction with
//!   conditional updates, so the availability flag never drifts from the
//!   set of active loans

pub mod connection;
pub mod repositories;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

// Re-export the main types that other modules need
pub use connection::DbConnection;
pub use repositories::{BookRepository, LoanRepository, SessionRepository, StudentRepository};
pub use traits::{BookStorage, LoanStorage, SessionStorage, StudentStorage};
