use serde::{Deserialize, Serialize};
use std::fmt;

/// A catalogue entry as exposed over the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Store identifier used in action paths (`/books/{id}`)
    pub id: i64,
    /// ISBN, unique across the catalogue (max 13 characters)
    pub isbn: String,
    pub title: String,
    pub author: String,
    /// Publication year (always positive)
    pub year: u32,
    /// False while an active loan references this book
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    /// Enrollment identifier, used as the login credential
    pub matricule: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: i64,
    pub book_id: i64,
    pub student_id: i64,
    /// Calendar date the loan was opened (YYYY-MM-DD)
    pub date_borrowed: String,
    pub returned: bool,
}

/// Severity of a one-shot status message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Error,
    Info,
}

impl MessageLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageLevel::Success => "success",
            MessageLevel::Error => "error",
            MessageLevel::Info => "info",
        }
    }

    /// Parse a stored level, unknown values read back as `Info`
    pub fn parse(value: &str) -> Self {
        match value {
            "success" => MessageLevel::Success,
            "error" => MessageLevel::Error,
            _ => MessageLevel::Info,
        }
    }
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status message queued by an action and shown once by the next view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: MessageLevel,
    pub text: String,
}

/// Response for the catalogue and search views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookListResponse {
    pub books: Vec<Book>,
    /// Sort key actually applied (after fallback)
    pub sort: String,
    /// Trimmed search query, only set by the search view
    pub query: Option<String>,
    pub logged_student: Option<Student>,
    pub messages: Vec<FlashMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDetailResponse {
    pub book: Book,
    /// Active loan of this book held by the logged-in student, if any
    pub active_loan: Option<Loan>,
    pub logged_student: Option<Student>,
    pub messages: Vec<FlashMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginPageResponse {
    /// Validated post-login redirect target
    pub next_url: String,
    pub logged_student: Option<Student>,
    pub messages: Vec<FlashMessage>,
}

/// Uniform error body returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
