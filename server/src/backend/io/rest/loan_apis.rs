//! # REST API for Borrowing and Returning Books
//!
//! Both actions require a logged-in student. Anonymous callers are sent to
//! the login page with a validated `next` target. Outcomes are reported as a
//! status message followed by a redirect.

use axum::{
    extract::{Query, State},
    response::Response,
    routing::post,
    Form, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::backend::domain::commands::loans::{
    BorrowBookCommand, BorrowOutcome, ReturnBookCommand, ReturnOutcome,
};
use crate::backend::domain::errors::LoanValidationError;
use crate::backend::domain::models::loan::MAX_ACTIVE_LOANS;
use crate::backend::io::rest::book_id::BookIdSegment;
use crate::backend::io::rest::redirects::{login_url, CATALOGUE_PATH};
use crate::backend::io::rest::session::{redirect_with_message, SessionContext};
use crate::backend::io::rest::ApiError;
use crate::backend::AppState;
use shared::MessageLevel;

pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to perform this action.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/books/:book_id/borrow", post(borrow_book))
        .route("/books/:book_id/return", post(return_book))
}

/// `next` as sent in the query string or the form body
#[derive(Debug, Default, Deserialize)]
pub struct NextParams {
    pub next: Option<String>,
}

pub async fn borrow_book(
    State(state): State<AppState>,
    session: SessionContext,
    segment: BookIdSegment,
    Query(query): Query<NextParams>,
    form: Option<Form<NextParams>>,
) -> Result<Response, ApiError> {
    info!("POST /books/{}/borrow", segment.0);

    let form_next = form.and_then(|Form(form)| form.next);
    let Some(student) = session.student.clone() else {
        return require_login(&state, &session, form_next.or(query.next)).await;
    };
    let book_id = segment.parse()?;

    let outcome = state
        .loan_service
        .borrow_book(BorrowBookCommand { book_id, student })
        .await?;

    let (level, text) = match outcome {
        BorrowOutcome::Borrowed(_) => (MessageLevel::Success, "Book borrowed.".to_string()),
        BorrowOutcome::Rejected(LoanValidationError::LoanLimitExceeded) => (
            MessageLevel::Error,
            format!("Borrowing limit reached ({}).", MAX_ACTIVE_LOANS),
        ),
        BorrowOutcome::Rejected(LoanValidationError::BookUnavailable) => {
            (MessageLevel::Error, "This book is unavailable.".to_string())
        }
    };

    let next = action_next(&state, &session, form_next.or(query.next));
    redirect_with_message(&state, &session, level, text, &next).await
}

pub async fn return_book(
    State(state): State<AppState>,
    session: SessionContext,
    segment: BookIdSegment,
    Query(query): Query<NextParams>,
    form: Option<Form<NextParams>>,
) -> Result<Response, ApiError> {
    info!("POST /books/{}/return", segment.0);

    let form_next = form.and_then(|Form(form)| form.next);
    let Some(student) = session.student.clone() else {
        return require_login(&state, &session, form_next.or(query.next)).await;
    };
    let book_id = segment.parse()?;

    let outcome = state
        .loan_service
        .return_book(ReturnBookCommand { book_id, student })
        .await?;

    let (level, text) = match outcome {
        ReturnOutcome::Returned(_) => (MessageLevel::Success, "Book returned."),
        ReturnOutcome::NoActiveLoan => (MessageLevel::Error, "No active loan found for this book."),
    };

    let next = action_next(&state, &session, form_next.or(query.next));
    redirect_with_message(&state, &session, level, text, &next).await
}

fn action_next(state: &AppState, session: &SessionContext, candidate: Option<String>) -> String {
    state
        .redirect_policy
        .resolve(candidate.as_deref(), session.host.as_deref(), CATALOGUE_PATH)
}

/// Send an anonymous caller to the login page, remembering where to come back
async fn require_login(
    state: &AppState,
    session: &SessionContext,
    next: Option<String>,
) -> Result<Response, ApiError> {
    let candidate = next.or_else(|| session.referer.clone());
    let next = action_next(state, session, candidate);
    info!("Anonymous action, redirecting to login (next: {})", next);

    redirect_with_message(
        state,
        session,
        MessageLevel::Error,
        LOGIN_REQUIRED_MESSAGE,
        &login_url(&next),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::io::rest::test_support::{json_body, location, session_cookie_value, TestApp};
    use axum::http::{header, StatusCode};
    use shared::{BookDetailResponse, BookListResponse, ErrorResponse};

    async fn app_with_student() -> TestApp {
        let app = TestApp::new().await;
        app.env.create_student("MAT001").await.unwrap();
        app.env.create_student("MAT002").await.unwrap();
        app
    }

    #[tokio::test]
    async fn test_anonymous_borrow_redirects_to_login() {
        let app = app_with_student().await;
        let book = app.env.create_book("9780451524935", "1984").await.unwrap();

        let response = app
            .post_form(&format!("/books/{}/borrow", book.id), "next=%2Fsearch%3Fq%3D1984", None)
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?next=%2Fsearch%3Fq%3D1984");
        let token = session_cookie_value(&response).expect("anonymous session cookie");

        let page: BookListResponse = json_body(app.get("/", Some(&token)).await).await;
        assert_eq!(page.messages.len(), 1);
        assert_eq!(page.messages[0].text, LOGIN_REQUIRED_MESSAGE);
        assert_eq!(page.messages[0].level, MessageLevel::Error);

        assert_eq!(app.env.count_loans().await.unwrap(), 0);
        assert!(app.env.book_available(book.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_anonymous_borrow_with_unsafe_next_uses_catalogue() {
        let app = app_with_student().await;
        let book = app.env.create_book("9780451524935", "1984").await.unwrap();

        let response = app
            .post_form(&format!("/books/{}/borrow", book.id), "next=https%3A%2F%2Fevil.com%2F", None)
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?next=%2F");
    }

    #[tokio::test]
    async fn test_anonymous_borrow_falls_back_to_referer() {
        let app = app_with_student().await;
        let book = app.env.create_book("9780451524935", "1984").await.unwrap();

        let response = app
            .post_form_with_headers(
                &format!("/books/{}/borrow", book.id),
                "",
                None,
                &[(header::REFERER, "http://localhost:3000/books/1")],
            )
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            location(&response),
            "/login?next=http%3A%2F%2Flocalhost%3A3000%2Fbooks%2F1"
        );
    }

    #[tokio::test]
    async fn test_anonymous_borrow_with_offsite_referer_uses_catalogue() {
        let app = app_with_student().await;
        let book = app.env.create_book("9780451524935", "1984").await.unwrap();

        let response = app
            .post_form_with_headers(
                &format!("/books/{}/borrow", book.id),
                "",
                None,
                &[(header::REFERER, "https://evil.com/books/1")],
            )
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?next=%2F");
    }

    #[tokio::test]
    async fn test_query_next_is_used_when_form_has_none() {
        let app = app_with_student().await;
        let book = app.env.create_book("9780451524935", "1984").await.unwrap();

        let response = app
            .post_form_with_headers(
                &format!("/books/{}/borrow?next=%2Fsearch", book.id),
                "",
                None,
                &[(header::REFERER, "http://localhost:3000/books/1")],
            )
            .await;
        assert_eq!(location(&response), "/login?next=%2Fsearch");

        // a form next still wins over the query string
        let response = app
            .post_form(
                &format!("/books/{}/borrow?next=%2Fsearch", book.id),
                &format!("next=%2Fbooks%2F{}", book.id),
                None,
            )
            .await;
        assert_eq!(location(&response), format!("/login?next=%2Fbooks%2F{}", book.id));
    }

    #[tokio::test]
    async fn test_malformed_book_id_on_actions() {
        let app = app_with_student().await;

        // identity is checked before the id
        let response = app.post_form("/books/abc/borrow", "", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).starts_with("/login?next="));

        let token = app.login("MAT001").await;
        for uri in ["/books/abc/borrow", "/books/99999999999999999999/return"] {
            let response = app.post_form(uri, "", Some(&token)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);

            let body: ErrorResponse = json_body(response).await;
            assert_eq!(body.code, "NOT_FOUND");
        }
        assert_eq!(app.env.count_loans().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_borrow_then_return_flow() {
        let app = app_with_student().await;
        let book = app.env.create_book("9780451524935", "1984").await.unwrap();
        let token = app.login("MAT001").await;
        // drain the login message
        app.get("/", Some(&token)).await;

        let response = app
            .post_form(&format!("/books/{}/borrow", book.id), "", Some(&token))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        assert!(session_cookie_value(&response).is_none());

        let detail: BookDetailResponse =
            json_body(app.get(&format!("/books/{}", book.id), Some(&token)).await).await;
        assert!(!detail.book.available);
        assert!(detail.active_loan.is_some());
        assert_eq!(detail.messages[0].text, "Book borrowed.");

        let response = app
            .post_form(
                &format!("/books/{}/return", book.id),
                &format!("next=%2Fbooks%2F{}", book.id),
                Some(&token),
            )
            .await;
        assert_eq!(location(&response), format!("/books/{}", book.id));

        let detail: BookDetailResponse =
            json_body(app.get(&format!("/books/{}", book.id), Some(&token)).await).await;
        assert!(detail.book.available);
        assert!(detail.active_loan.is_none());
        assert_eq!(detail.messages[0].text, "Book returned.");
        assert_eq!(app.env.count_loans().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_borrowing_a_taken_book_reports_unavailable() {
        let app = app_with_student().await;
        let book = app.env.create_book("9780451524935", "1984").await.unwrap();
        let first = app.login("MAT001").await;
        let second = app.login("MAT002").await;

        app.post_form(&format!("/books/{}/borrow", book.id), "", Some(&first)).await;
        let response = app
            .post_form(&format!("/books/{}/borrow", book.id), "", Some(&second))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let page: BookListResponse = json_body(app.get("/", Some(&second)).await).await;
        let texts: Vec<_> = page.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["Logged in as Student MAT002.", "This book is unavailable."]);
        assert_eq!(app.env.count_loans().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fourth_borrow_hits_the_limit() {
        let app = app_with_student().await;
        let token = app.login("MAT001").await;
        app.get("/", Some(&token)).await;

        for i in 0..4 {
            let book = app
                .env
                .create_book(&format!("97800000000{:02}", i), &format!("Book {}", i))
                .await
                .unwrap();
            app.post_form(&format!("/books/{}/borrow", book.id), "", Some(&token)).await;
        }

        let page: BookListResponse = json_body(app.get("/", Some(&token)).await).await;
        let last = page.messages.last().expect("messages queued");
        assert_eq!(last.text, "Borrowing limit reached (3).");
        assert_eq!(last.level, MessageLevel::Error);
        assert_eq!(app.env.count_loans().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_return_without_loan() {
        let app = app_with_student().await;
        let book = app.env.create_book("9780451524935", "1984").await.unwrap();
        let token = app.login("MAT001").await;
        app.get("/", Some(&token)).await;

        app.post_form(&format!("/books/{}/return", book.id), "", Some(&token)).await;

        let page: BookListResponse = json_body(app.get("/", Some(&token)).await).await;
        assert_eq!(page.messages[0].text, "No active loan found for this book.");
    }

    #[tokio::test]
    async fn test_borrow_missing_book_is_404() {
        let app = app_with_student().await;
        let token = app.login("MAT001").await;

        let response = app.post_form("/books/4242/borrow", "", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
