use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub year: u32,
    pub available: bool,
}

/// Fields needed to catalogue a book; new books start available
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub year: u32,
}

/// Column the catalogue can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookSortKey {
    #[default]
    Title,
    Author,
    Year,
}

impl BookSortKey {
    /// Parse a user-supplied key. Anything unrecognised sorts by title.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("author") => BookSortKey::Author,
            Some("year") => BookSortKey::Year,
            _ => BookSortKey::Title,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookSortKey::Title => "title",
            BookSortKey::Author => "author",
            BookSortKey::Year => "year",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!(BookSortKey::parse_or_default(Some("author")), BookSortKey::Author);
        assert_eq!(BookSortKey::parse_or_default(Some("year")), BookSortKey::Year);
        assert_eq!(BookSortKey::parse_or_default(Some("title")), BookSortKey::Title);
        assert_eq!(BookSortKey::parse_or_default(None), BookSortKey::Title);
    }

    #[test]
    fn test_unknown_sort_key_falls_back_to_title() {
        assert_eq!(BookSortKey::parse_or_default(Some("bogus")), BookSortKey::Title);
        assert_eq!(BookSortKey::parse_or_default(Some("isbn; DROP TABLE books")), BookSortKey::Title);
        assert_eq!(BookSortKey::parse_or_default(Some("")), BookSortKey::Title);
    }
}
