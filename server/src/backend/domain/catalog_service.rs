use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::domain::commands::catalog::{
    BookDetailResult, BookListQuery, BookListResult, BookSearchQuery,
};
use crate::backend::domain::errors::{LibraryError, LibraryResult};
use crate::backend::domain::models::book::{Book, BookSortKey, NewBook};
use crate::backend::domain::models::student::Student;
use crate::backend::storage::{BookRepository, BookStorage, DbConnection, LoanRepository, LoanStorage};

const MAX_ISBN_LEN: usize = 13;
const MAX_TITLE_LEN: usize = 200;
const MAX_AUTHOR_LEN: usize = 150;

/// Service for browsing and maintaining the book catalogue
#[derive(Clone)]
pub struct CatalogService {
    books: Arc<dyn BookStorage>,
    loans: Arc<dyn LoanStorage>,
}

impl CatalogService {
    pub fn new(db: DbConnection) -> Self {
        Self::with_storage(
            Arc::new(BookRepository::new(db.clone())),
            Arc::new(LoanRepository::new(db)),
        )
    }

    pub fn with_storage(books: Arc<dyn BookStorage>, loans: Arc<dyn LoanStorage>) -> Self {
        Self { books, loans }
    }

    /// List every book, ordered by the requested key (title when missing or unknown)
    pub async fn list_books(&self, query: BookListQuery) -> Result<BookListResult> {
        let sort = BookSortKey::parse_or_default(query.sort.as_deref());
        if let Some(raw) = query.sort.as_deref() {
            if raw.trim() != sort.as_str() {
                warn!("Unknown sort key {:?}, using title", raw);
            }
        }

        let books = self.books.list_books(sort).await?;
        info!("Listed {} books sorted by {}", books.len(), sort.as_str());

        Ok(BookListResult {
            books,
            sort,
            query: None,
        })
    }

    /// Case-insensitive substring search on title, author and ISBN.
    /// An empty query returns the whole catalogue ordered by title.
    pub async fn search_books(&self, query: BookSearchQuery) -> Result<BookListResult> {
        let trimmed = query.query.as_deref().unwrap_or_default().trim().to_string();

        let books = if trimmed.is_empty() {
            self.books.list_books(BookSortKey::Title).await?
        } else {
            self.books.search_books(&trimmed).await?
        };
        info!("Search {:?} matched {} books", trimmed, books.len());

        Ok(BookListResult {
            books,
            sort: BookSortKey::Title,
            query: Some(trimmed),
        })
    }

    pub async fn get_book(&self, book_id: i64) -> LibraryResult<Book> {
        self.books
            .get_book(book_id)
            .await?
            .ok_or_else(|| LibraryError::not_found("Book", book_id))
    }

    pub async fn find_by_isbn(&self, isbn: &str) -> LibraryResult<Option<Book>> {
        Ok(self.books.get_book_by_isbn(isbn.trim()).await?)
    }

    /// Book plus the active loan the viewer holds on it (none for anonymous viewers)
    pub async fn book_detail(&self, book_id: i64, viewer: Option<&Student>) -> LibraryResult<BookDetailResult> {
        let book = self.get_book(book_id).await?;

        let active_loan = match viewer {
            Some(student) => self.loans.find_active_loan(book.id, student.id).await?,
            None => None,
        };

        Ok(BookDetailResult { book, active_loan })
    }

    /// Validate and catalogue a new book
    pub async fn add_book(&self, book: NewBook) -> LibraryResult<Book> {
        let book = NewBook {
            isbn: book.isbn.trim().to_string(),
            title: book.title.trim().to_string(),
            author: book.author.trim().to_string(),
            year: book.year,
        };
        Self::validate_new_book(&book)?;

        let stored = self.books.store_book(&book).await?;
        info!("Catalogued book {} ({})", stored.title, stored.isbn);
        Ok(stored)
    }

    fn validate_new_book(book: &NewBook) -> LibraryResult<()> {
        if book.isbn.is_empty() {
            return Err(LibraryError::invalid("ISBN cannot be empty"));
        }
        if book.isbn.chars().count() > MAX_ISBN_LEN {
            return Err(LibraryError::invalid(format!(
                "ISBN cannot exceed {} characters",
                MAX_ISBN_LEN
            )));
        }
        if book.title.is_empty() {
            return Err(LibraryError::invalid("Title cannot be empty"));
        }
        if book.title.chars().count() > MAX_TITLE_LEN {
            return Err(LibraryError::invalid(format!(
                "Title cannot exceed {} characters",
                MAX_TITLE_LEN
            )));
        }
        if book.author.is_empty() {
            return Err(LibraryError::invalid("Author cannot be empty"));
        }
        if book.author.chars().count() > MAX_AUTHOR_LEN {
            return Err(LibraryError::invalid(format!(
                "Author cannot exceed {} characters",
                MAX_AUTHOR_LEN
            )));
        }
        if book.year == 0 {
            return Err(LibraryError::invalid("Year must be positive"));
        }
        Ok(())
    }
}
