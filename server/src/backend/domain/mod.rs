//! # Domain Module
//!
//! Business logic of the library: the catalogue, students, sessions and the
//! loan state transitions. It depends on the storage traits only and knows
//! nothing about HTTP.
//!
//! ## Module Organization
//!
//! - **loan_service**: `can_borrow`, `create_loan`, `return_loan`, `find_active_loan`
//! - **catalog_service**: listing, searching and cataloguing books
//! - **identity_service**: session resolution, login, logout, flash messages
//! - **student_service**: student registration
//! - **commands**: internal query/command/outcome types
//! - **errors**: validation and service error enums
//!
//! ## Business Rules
//!
//! - A student holds at most three active loans
//! - A book is on loan to at most one student at a time
//! - A book is available iff no active loan references it
//! - A returned loan is never modified again

pub mod catalog_service;
pub mod commands;
pub mod errors;
pub mod identity_service;
pub mod loan_service;
pub mod models;
pub mod student_service;

pub use catalog_service::*;
pub use errors::*;
pub use identity_service::*;
pub use loan_service::*;
pub use student_service::*;
