//! Loan service domain logic.
//!
//! Owns the borrowing rules of the library:
//!
//! - A student may hold at most [`MAX_ACTIVE_LOANS`] unreturned loans
//! - A book may be on loan to only one student at a time
//! - Returning a book makes it available again; a returned loan is terminal
//!
//! The book's `available` flag is a cached projection of "no active loan
//! exists". Every transition updates the loan and the flag together through
//! [`LoanStorage`], which runs both writes in one transaction.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::domain::commands::loans::{
    BorrowBookCommand, BorrowOutcome, ReturnBookCommand, ReturnOutcome,
};
use crate::backend::domain::errors::{LibraryError, LibraryResult, LoanValidationError};
use crate::backend::domain::models::book::Book;
use crate::backend::domain::models::loan::{Loan, NewLoan, OpenLoanOutcome, MAX_ACTIVE_LOANS};
use crate::backend::domain::models::student::Student;
use crate::backend::storage::{BookRepository, BookStorage, DbConnection, LoanRepository, LoanStorage};

/// Service for opening and closing loans
#[derive(Clone)]
pub struct LoanService {
    books: Arc<dyn BookStorage>,
    loans: Arc<dyn LoanStorage>,
}

impl LoanService {
    /// Create a LoanService backed by the SQLite repositories
    pub fn new(db: DbConnection) -> Self {
        Self::with_storage(
            Arc::new(BookRepository::new(db.clone())),
            Arc::new(LoanRepository::new(db)),
        )
    }

    pub fn with_storage(books: Arc<dyn BookStorage>, loans: Arc<dyn LoanStorage>) -> Self {
        Self { books, loans }
    }

    /// True while the student holds fewer than the maximum number of active loans
    pub async fn can_borrow(&self, student: &Student) -> Result<bool> {
        let active = self.loans.count_active_loans(student.id).await?;
        Ok(active < MAX_ACTIVE_LOANS)
    }

    /// Open a loan of `book` for `student`.
    ///
    /// Checks the loan limit first, then availability. The store repeats
    /// both checks inside the transaction, so a concurrent borrow that wins
    /// the race is reported as the same validation error.
    pub async fn create_loan(&self, book: &Book, student: &Student) -> LibraryResult<Loan> {
        if !self.can_borrow(student).await? {
            return Err(LoanValidationError::LoanLimitExceeded.into());
        }
        if !book.available {
            return Err(LoanValidationError::BookUnavailable.into());
        }

        let new_loan = NewLoan {
            book_id: book.id,
            student_id: student.id,
            date_borrowed: today(),
        };

        match self.loans.open_loan(&new_loan, MAX_ACTIVE_LOANS).await? {
            OpenLoanOutcome::Opened(loan) => {
                info!(
                    "Opened loan {} of book {} for student {}",
                    loan.id, book.id, student.matricule
                );
                Ok(loan)
            }
            OpenLoanOutcome::LimitReached => {
                warn!("Loan limit reached for {} during transaction", student.matricule);
                Err(LoanValidationError::LoanLimitExceeded.into())
            }
            OpenLoanOutcome::BookTaken => {
                warn!("Book {} was taken by a concurrent borrow", book.id);
                Err(LoanValidationError::BookUnavailable.into())
            }
        }
    }

    /// Close a loan and make its book available again.
    /// Returning an already-returned loan is a no-op.
    pub async fn return_loan(&self, loan: Loan) -> LibraryResult<Loan> {
        if !loan.is_active() {
            info!("Loan {} already returned", loan.id);
            return Ok(loan);
        }

        let closed = self
            .loans
            .close_loan(loan.id)
            .await?
            .ok_or_else(|| LibraryError::not_found("Loan", loan.id))?;

        info!("Closed loan {} of book {}", closed.id, closed.book_id);
        Ok(closed)
    }

    /// The unreturned loan of `book` held by `student`, if any
    pub async fn find_active_loan(&self, book: &Book, student: &Student) -> Result<Option<Loan>> {
        self.loans.find_active_loan(book.id, student.id).await
    }

    /// Number of unreturned loans held by the student
    pub async fn active_loan_count(&self, student: &Student) -> Result<u32> {
        self.loans.count_active_loans(student.id).await
    }

    /// Load the book and try to open a loan for the student
    pub async fn borrow_book(&self, command: BorrowBookCommand) -> LibraryResult<BorrowOutcome> {
        let book = self.load_book(command.book_id).await?;

        match self.create_loan(&book, &command.student).await {
            Ok(loan) => Ok(BorrowOutcome::Borrowed(loan)),
            Err(LibraryError::Validation(reason)) => {
                info!(
                    "Borrow of book {} by {} rejected: {}",
                    book.id, command.student.matricule, reason
                );
                Ok(BorrowOutcome::Rejected(reason))
            }
            Err(e) => Err(e),
        }
    }

    /// Load the book and close the student's active loan of it
    pub async fn return_book(&self, command: ReturnBookCommand) -> LibraryResult<ReturnOutcome> {
        let book = self.load_book(command.book_id).await?;

        match self.find_active_loan(&book, &command.student).await? {
            Some(loan) => Ok(ReturnOutcome::Returned(self.return_loan(loan).await?)),
            None => {
                info!(
                    "No active loan of book {} for {}",
                    book.id, command.student.matricule
                );
                Ok(ReturnOutcome::NoActiveLoan)
            }
        }
    }

    async fn load_book(&self, book_id: i64) -> LibraryResult<Book> {
        self.books
            .get_book(book_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("Book", book_id))
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
