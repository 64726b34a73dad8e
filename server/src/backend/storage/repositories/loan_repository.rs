use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row};
use tracing::debug;

use crate::backend::domain::models::loan::{Loan, NewLoan, OpenLoanOutcome};
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::LoanStorage;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository for loan operations
#[derive(Clone)]
pub struct LoanRepository {
    db: DbConnection,
}

impl LoanRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn loan_from_row(row: &SqliteRow) -> Result<Loan> {
        let date_borrowed: String = row.get("date_borrowed");
        Ok(Loan {
            id: row.get("id"),
            book_id: row.get("book_id"),
            student_id: row.get("student_id"),
            date_borrowed: NaiveDate::parse_from_str(&date_borrowed, DATE_FORMAT)
                .with_context(|| format!("Invalid date_borrowed in loans: {}", date_borrowed))?,
            returned: row.get("returned"),
        })
    }
}

#[async_trait]
impl LoanStorage for LoanRepository {
    async fn count_active_loans(&self, student_id: i64) -> Result<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE student_id = ? AND returned = FALSE",
        )
        .bind(student_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(count as u32)
    }

    async fn find_active_loan(&self, book_id: i64, student_id: i64) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT id, book_id, student_id, date_borrowed, returned
            FROM loans
            WHERE book_id = ? AND student_id = ? AND returned = FALSE
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(book_id)
        .bind(student_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::loan_from_row).transpose()
    }

    async fn open_loan(&self, loan: &NewLoan, max_active: u32) -> Result<OpenLoanOutcome> {
        let date_borrowed = loan.date_borrowed.format(DATE_FORMAT).to_string();

        let mut tx = self.db.pool().begin().await?;

        // Writing first makes SQLite take the write lock before any read,
        // so concurrent borrowers wait on the busy timeout instead of deadlocking.
        let inserted = sqlx::query(
            r#"
            INSERT INTO loans (book_id, student_id, date_borrowed, returned)
            SELECT ?, ?, ?, FALSE
            WHERE (
                SELECT COUNT(*) FROM loans WHERE student_id = ? AND returned = FALSE
            ) < ?
            "#,
        )
        .bind(loan.book_id)
        .bind(loan.student_id)
        .bind(&date_borrowed)
        .bind(loan.student_id)
        .bind(max_active as i64)
        .execute(&mut *tx)
        .await
        .context("Failed to insert loan")?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            debug!("Loan limit reached for student {}", loan.student_id);
            return Ok(OpenLoanOutcome::LimitReached);
        }
        let loan_id = inserted.last_insert_rowid();

        let reserved = sqlx::query("UPDATE books SET available = FALSE WHERE id = ? AND available = TRUE")
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await
            .context("Failed to reserve book")?;

        if reserved.rows_affected() == 0 {
            tx.rollback().await?;
            debug!("Book {} already taken", loan.book_id);
            return Ok(OpenLoanOutcome::BookTaken);
        }

        tx.commit().await?;

        Ok(OpenLoanOutcome::Opened(Loan {
            id: loan_id,
            book_id: loan.book_id,
            student_id: loan.student_id,
            date_borrowed: loan.date_borrowed,
            returned: false,
        }))
    }

    async fn close_loan(&self, loan_id: i64) -> Result<Option<Loan>> {
        let mut tx = self.db.pool().begin().await?;

        let closed = sqlx::query("UPDATE loans SET returned = TRUE WHERE id = ? AND returned = FALSE")
            .bind(loan_id)
            .execute(&mut *tx)
            .await
            .context("Failed to close loan")?;

        if closed.rows_affected() == 1 {
            sqlx::query(
                r#"
                UPDATE books SET available = TRUE
                WHERE id = (SELECT book_id FROM loans WHERE id = ?)
                "#,
            )
            .bind(loan_id)
            .execute(&mut *tx)
            .await
            .context("Failed to release book")?;
        }

        let row = sqlx::query(
            r#"
            SELECT id, book_id, student_id, date_borrowed, returned
            FROM loans
            WHERE id = ?
            "#,
        )
        .bind(loan_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        row.as_ref().map(Self::loan_from_row).transpose()
    }
}
