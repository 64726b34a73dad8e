//! Test utilities providing a throwaway SQLite database per test
//!
//! The database lives in a temporary directory that is removed when the
//! `TestEnvironment` is dropped, even if the test panics.

use anyhow::Result;
use std::path::PathBuf;
use tempfile::TempDir;

use super::connection::DbConnection;
use super::repositories::{BookRepository, StudentRepository};
use super::traits::{BookStorage, StudentStorage};
use crate::backend::domain::models::book::{Book, NewBook};
use crate::backend::domain::models::student::{NewStudent, Student};

/// RAII test environment that owns the temporary database
pub struct TestEnvironment {
    /// Kept alive so the directory is only removed on drop
    _temp_dir: TempDir,
    pub connection: DbConnection,
    pub db_path: PathBuf,
}

impl TestEnvironment {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("library_test.db");
        let url = format!("sqlite://{}", db_path.display());
        let connection = DbConnection::new(&url).await?;

        Ok(Self {
            _temp_dir: temp_dir,
            connection,
            db_path,
        })
    }

    /// Insert a book with placeholder author and year
    pub async fn create_book(&self, isbn: &str, title: &str) -> Result<Book> {
        BookRepository::new(self.connection.clone())
            .store_book(&NewBook {
                isbn: isbn.to_string(),
                title: title.to_string(),
                author: "Test Author".to_string(),
                year: 2000,
            })
            .await
    }

    /// Insert a student whose email is derived from the matricule
    pub async fn create_student(&self, matricule: &str) -> Result<Student> {
        StudentRepository::new(self.connection.clone())
            .store_student(&NewStudent {
                matricule: matricule.to_string(),
                name: format!("Student {}", matricule),
                email: format!("{}@example.com", matricule.to_lowercase()),
            })
            .await
    }

    /// Read the availability flag straight from the store
    pub async fn book_available(&self, book_id: i64) -> Result<bool> {
        let available: bool = sqlx::query_scalar("SELECT available FROM books WHERE id = ?")
            .bind(book_id)
            .fetch_one(self.connection.pool())
            .await?;
        Ok(available)
    }

    pub async fn count_loans(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans")
            .fetch_one(self.connection.pool())
            .await?;
        Ok(count)
    }
}
