use crate::backend::domain::models::loan::MAX_ACTIVE_LOANS;

/// Business-rule violations raised when opening a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoanValidationError {
    #[error("Borrowing limit reached ({} active loans)", MAX_ACTIVE_LOANS)]
    LoanLimitExceeded,
    #[error("This book is not available")]
    BookUnavailable,
}

/// Errors surfaced by the domain services
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error(transparent)]
    Validation(#[from] LoanValidationError),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("No student with matricule '{0}'")]
    StudentNotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl LibraryError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        LibraryError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        LibraryError::InvalidInput(message.into())
    }
}

pub type LibraryResult<T> = std::result::Result<T, LibraryError>;
