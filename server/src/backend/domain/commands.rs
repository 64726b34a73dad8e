//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps request parameters to
//! these types and maps the results back to the DTOs of the `shared` crate.

pub mod catalog {
    use crate::backend::domain::models::book::{Book, BookSortKey};
    use crate::backend::domain::models::loan::Loan;

    /// Query for the catalogue view.
    #[derive(Debug, Clone, Default)]
    pub struct BookListQuery {
        /// Raw sort parameter; unknown values fall back to title
        pub sort: Option<String>,
    }

    /// Query for the search view.
    #[derive(Debug, Clone, Default)]
    pub struct BookSearchQuery {
        pub query: Option<String>,
    }

    /// Books returned by listing or searching.
    #[derive(Debug, Clone)]
    pub struct BookListResult {
        pub books: Vec<Book>,
        pub sort: BookSortKey,
        /// Trimmed query, set for searches only
        pub query: Option<String>,
    }

    /// Book detail with the viewer's active loan.
    #[derive(Debug, Clone)]
    pub struct BookDetailResult {
        pub book: Book,
        pub active_loan: Option<Loan>,
    }
}

pub mod loans {
    use crate::backend::domain::errors::LoanValidationError;
    use crate::backend::domain::models::loan::Loan;
    use crate::backend::domain::models::student::Student;

    /// Input for borrowing a book.
    #[derive(Debug, Clone)]
    pub struct BorrowBookCommand {
        pub book_id: i64,
        pub student: Student,
    }

    /// Input for returning a book.
    #[derive(Debug, Clone)]
    pub struct ReturnBookCommand {
        pub book_id: i64,
        pub student: Student,
    }

    /// Result of a borrow attempt. Rule violations are an outcome, not an error.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum BorrowOutcome {
        Borrowed(Loan),
        Rejected(LoanValidationError),
    }

    /// Result of a return attempt.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ReturnOutcome {
        Returned(Loan),
        /// The student holds no active loan for this book
        NoActiveLoan,
    }
}

pub mod identity {
    use crate::backend::domain::models::student::Student;

    /// Input for logging in with a matricule.
    #[derive(Debug, Clone)]
    pub struct LoginCommand {
        /// Session the visitor currently holds, replaced on success
        pub session_token: Option<String>,
        pub matricule: String,
    }

    /// Result of a successful login.
    #[derive(Debug, Clone)]
    pub struct LoginResult {
        pub student: Student,
        /// Fresh session token bound to the student
        pub session_token: String,
    }
}
