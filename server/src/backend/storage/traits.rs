//! # Storage Traits
//!
//! Storage abstraction traits that let the domain layer run against any
//! relational backend. The SQLite repositories in `repositories/` are the
//! production implementations.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::FlashMessage;

use crate::backend::domain::models::book::{Book, BookSortKey, NewBook};
use crate::backend::domain::models::loan::{Loan, NewLoan, OpenLoanOutcome};
use crate::backend::domain::models::session::Session;
use crate::backend::domain::models::student::{NewStudent, Student};

/// Interface for book catalogue storage
#[async_trait]
pub trait BookStorage: Send + Sync {
    /// Insert a new book and return it with its assigned ID
    async fn store_book(&self, book: &NewBook) -> Result<Book>;

    /// Retrieve a book by ID
    async fn get_book(&self, book_id: i64) -> Result<Option<Book>>;

    /// Retrieve a book by ISBN
    async fn get_book_by_isbn(&self, isbn: &str) -> Result<Option<Book>>;

    /// List every book ordered by the given key
    async fn list_books(&self, sort: BookSortKey) -> Result<Vec<Book>>;

    /// Substring search over title, author and ISBN, case-insensitive for
    /// all Unicode letters, ordered by title
    async fn search_books(&self, query: &str) -> Result<Vec<Book>>;
}

/// Interface for student storage
#[async_trait]
pub trait StudentStorage: Send + Sync {
    async fn store_student(&self, student: &NewStudent) -> Result<Student>;

    async fn get_student(&self, student_id: i64) -> Result<Option<Student>>;

    /// Exact match on matricule
    async fn get_student_by_matricule(&self, matricule: &str) -> Result<Option<Student>>;
}

/// Interface for loan storage
///
/// Opening and closing a loan touch two rows (the loan and its book); both
/// operations run as a single store transaction.
#[async_trait]
pub trait LoanStorage: Send + Sync {
    /// Number of unreturned loans held by a student
    async fn count_active_loans(&self, student_id: i64) -> Result<u32>;

    /// The unreturned loan for a book/student pair, if any
    async fn find_active_loan(&self, book_id: i64, student_id: i64) -> Result<Option<Loan>>;

    /// Atomically insert the loan and mark its book unavailable.
    /// The insert only happens while the student holds fewer than
    /// `max_active` loans and the book is still available; otherwise
    /// nothing is written and the failed guard is reported.
    async fn open_loan(&self, loan: &NewLoan, max_active: u32) -> Result<OpenLoanOutcome>;

    /// Atomically mark the loan returned and its book available.
    /// Returns the stored loan after the operation, None if it does not exist.
    async fn close_loan(&self, loan_id: i64) -> Result<Option<Loan>>;
}

/// Interface for session and flash message storage
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn store_session(&self, session: &Session) -> Result<()>;

    async fn get_session(&self, token: &str) -> Result<Option<Session>>;

    /// Remove the student from a session, keeping the session itself.
    /// Returns false if the session does not exist.
    async fn clear_session_student(&self, token: &str) -> Result<bool>;

    /// Delete a session and its queued messages
    async fn delete_session(&self, token: &str) -> Result<bool>;

    /// Delete every session created before `cutoff`, with its queued messages.
    /// Returns the number of sessions removed.
    async fn delete_sessions_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    async fn push_message(&self, token: &str, message: &FlashMessage) -> Result<()>;

    /// Remove and return the queued messages in insertion order
    async fn take_messages(&self, token: &str) -> Result<Vec<FlashMessage>>;
}
