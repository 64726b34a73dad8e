use anyhow::Result;
use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use crate::backend::domain::models::book::{Book, BookSortKey, NewBook};
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::BookStorage;

/// Repository for book operations
#[derive(Clone)]
pub struct BookRepository {
    db: DbConnection,
}

impl BookRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn book_from_row(row: &SqliteRow) -> Book {
        Book {
            id: row.get("id"),
            isbn: row.get("isbn"),
            title: row.get("title"),
            author: row.get("author"),
            year: row.get::<i64, _>("year") as u32,
            available: row.get("available"),
        }
    }

    /// Unicode-aware case folding; SQLite's LIKE only folds ASCII
    fn matches(book: &Book, needle: &str) -> bool {
        [&book.title, &book.author, &book.isbn]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[async_trait]
impl BookStorage for BookRepository {
    async fn store_book(&self, book: &NewBook) -> Result<Book> {
        let result = sqlx::query(
            r#"
            INSERT INTO books (isbn, title, author, year, available)
            VALUES (?, ?, ?, ?, TRUE)
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.year as i64)
        .execute(self.db.pool())
        .await?;

        Ok(Book {
            id: result.last_insert_rowid(),
            isbn: book.isbn.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            year: book.year,
            available: true,
        })
    }

    async fn get_book(&self, book_id: i64) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, isbn, title, author, year, available
            FROM books
            WHERE id = ?
            "#,
        )
        .bind(book_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::book_from_row))
    }

    async fn get_book_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, isbn, title, author, year, available
            FROM books
            WHERE isbn = ?
            "#,
        )
        .bind(isbn)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(Self::book_from_row))
    }

    async fn list_books(&self, sort: BookSortKey) -> Result<Vec<Book>> {
        // ORDER BY columns cannot be bound, so each key maps to a fixed statement
        let sql = match sort {
            BookSortKey::Title => {
                "SELECT id, isbn, title, author, year, available FROM books ORDER BY title ASC, id ASC"
            }
            BookSortKey::Author => {
                "SELECT id, isbn, title, author, year, available FROM books ORDER BY author ASC, id ASC"
            }
            BookSortKey::Year => {
                "SELECT id, isbn, title, author, year, available FROM books ORDER BY year ASC, id ASC"
            }
        };

        let rows = sqlx::query(sql).fetch_all(self.db.pool()).await?;

        Ok(rows.iter().map(Self::book_from_row).collect())
    }

    async fn search_books(&self, query: &str) -> Result<Vec<Book>> {
        let needle = query.to_lowercase();

        let rows = sqlx::query(
            r#"
            SELECT id, isbn, title, author, year, available
            FROM books
            ORDER BY title ASC, id ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(Self::book_from_row)
            .filter(|book| Self::matches(book, &needle))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::test_utils::TestEnvironment;

    fn new_book(isbn: &str, title: &str, author: &str, year: u32) -> NewBook {
        NewBook {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: author.to_string(),
            year,
        }
    }

    #[tokio::test]
    async fn test_store_and_get_book() {
        let env = TestEnvironment::new().await.expect("Failed to create test environment");
        let repo = BookRepository::new(env.connection.clone());

        let stored = repo
            .store_book(&new_book("9780451524935", "1984", "George Orwell", 1949))
            .await
            .expect("Failed to store book");
        assert!(stored.available);

        let fetched = repo.get_book(stored.id).await.expect("Query failed");
        assert_eq!(fetched, Some(stored.clone()));

        let by_isbn = repo.get_book_by_isbn("9780451524935").await.expect("Query failed");
        assert_eq!(by_isbn, Some(stored));
    }

    #[tokio::test]
    async fn test_duplicate_isbn_is_rejected() {
        let env = TestEnvironment::new().await.expect("Failed to create test environment");
        let repo = BookRepository::new(env.connection.clone());

        repo.store_book(&new_book("111", "First", "A", 2000)).await.unwrap();
        let duplicate = repo.store_book(&new_book("111", "Second", "B", 2001)).await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_list_books_orders_by_key() {
        let env = TestEnvironment::new().await.expect("Failed to create test environment");
        let repo = BookRepository::new(env.connection.clone());

        repo.store_book(&new_book("1", "Dune", "Herbert", 1965)).await.unwrap();
        repo.store_book(&new_book("2", "Brave New World", "Huxley", 1932)).await.unwrap();
        repo.store_book(&new_book("3", "Animal Farm", "Orwell", 1945)).await.unwrap();

        let by_title: Vec<String> = repo
            .list_books(BookSortKey::Title)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(by_title, vec!["Animal Farm", "Brave New World", "Dune"]);

        let by_author: Vec<String> = repo
            .list_books(BookSortKey::Author)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.author)
            .collect();
        assert_eq!(by_author, vec!["Herbert", "Huxley", "Orwell"]);

        let by_year: Vec<u32> = repo
            .list_books(BookSortKey::Year)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.year)
            .collect();
        assert_eq!(by_year, vec![1932, 1945, 1965]);
    }

    #[tokio::test]
    async fn test_search_matches_any_field_case_insensitively() {
        let env = TestEnvironment::new().await.expect("Failed to create test environment");
        let repo = BookRepository::new(env.connection.clone());

        repo.store_book(&new_book("9780451524935", "1984", "George Orwell", 1949)).await.unwrap();
        repo.store_book(&new_book("9780060850524", "Brave New World", "Aldous Huxley", 1932)).await.unwrap();

        let by_title = repo.search_books("1984").await.unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "1984");

        let by_author = repo.search_books("huxley").await.unwrap();
        assert_eq!(by_author.len(), 1);
        assert_eq!(by_author[0].title, "Brave New World");

        let by_isbn = repo.search_books("0060850").await.unwrap();
        assert_eq!(by_isbn.len(), 1);

        let wildcard = repo.search_books("%").await.unwrap();
        assert!(wildcard.is_empty(), "wildcards must match literally");
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let env = TestEnvironment::new().await.expect("Failed to create test environment");
        let repo = BookRepository::new(env.connection.clone());

        repo.store_book(&new_book("9782070360024", "Élise et Ödön", "Émile Zola", 1890)).await.unwrap();
        repo.store_book(&new_book("9780451524935", "1984", "George Orwell", 1949)).await.unwrap();

        for query in ["élise", "ÉLISE", "ödön", "ÉMILE"] {
            let found = repo.search_books(query).await.unwrap();
            assert_eq!(found.len(), 1, "{:?}", query);
            assert_eq!(found[0].title, "Élise et Ödön");
        }
    }
}
