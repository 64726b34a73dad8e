//! # REST API for Login and Logout
//!
//! Login is a lookup by matricule, no password. A successful login rotates the
//! session token and answers with a fresh `Set-Cookie`.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::backend::domain::commands::identity::LoginCommand;
use crate::backend::domain::LibraryError;
use crate::backend::io::rest::loan_apis::NextParams;
use crate::backend::io::rest::mappers::StudentMapper;
use crate::backend::io::rest::redirects::CATALOGUE_PATH;
use crate::backend::io::rest::session::{redirect_response, redirect_with_message, SessionContext};
use crate::backend::io::rest::ApiError;
use crate::backend::AppState;
use shared::{FlashMessage, LoginPageResponse, MessageLevel};

pub const UNKNOWN_MATRICULE_MESSAGE: &str = "Unknown matricule.";
pub const LOGGED_OUT_MESSAGE: &str = "You have been logged out.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub matricule: String,
    pub next: Option<String>,
}

pub async fn login_page(
    State(state): State<AppState>,
    session: SessionContext,
    Query(params): Query<NextParams>,
) -> Result<Json<LoginPageResponse>, ApiError> {
    info!("GET /login");

    let next_url = state
        .redirect_policy
        .resolve(params.next.as_deref(), session.host.as_deref(), CATALOGUE_PATH);
    let messages = state.identity_service.take_messages(session.token.as_deref()).await?;

    Ok(Json(LoginPageResponse {
        next_url,
        logged_student: session.student.map(StudentMapper::to_dto),
        messages,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    session: SessionContext,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    info!("POST /login - matricule: {:?}", form.matricule);

    let next_url = state
        .redirect_policy
        .resolve(form.next.as_deref(), session.host.as_deref(), CATALOGUE_PATH);

    let command = LoginCommand {
        session_token: session.token.clone(),
        matricule: form.matricule,
    };

    match state.identity_service.login(command).await {
        Ok(result) => {
            state
                .identity_service
                .push_message(
                    &result.session_token,
                    MessageLevel::Success,
                    format!("Logged in as {}.", result.student.name),
                )
                .await?;
            Ok(redirect_response(&next_url, Some(&result.session_token)))
        }
        Err(LibraryError::StudentNotFound(_)) => {
            let mut messages = state.identity_service.take_messages(session.token.as_deref()).await?;
            messages.push(FlashMessage {
                level: MessageLevel::Error,
                text: UNKNOWN_MATRICULE_MESSAGE.to_string(),
            });

            Ok(Json(LoginPageResponse {
                next_url,
                logged_student: session.student.map(StudentMapper::to_dto),
                messages,
            })
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn logout(State(state): State<AppState>, session: SessionContext) -> Result<Response, ApiError> {
    info!("POST /logout");

    state.identity_service.logout(session.token.as_deref()).await?;
    redirect_with_message(&state, &session, MessageLevel::Info, LOGGED_OUT_MESSAGE, CATALOGUE_PATH).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::io::rest::test_support::{json_body, location, session_cookie_value, TestApp};
    use crate::backend::domain::models::session::Session;
    use crate::backend::storage::{SessionRepository, SessionStorage};
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use shared::BookListResponse;

    #[tokio::test]
    async fn test_login_sets_cookie_and_redirects_to_next() {
        let app = TestApp::new().await;
        app.env.create_student("MAT001").await.unwrap();

        let response = app
            .post_form("/login", "matricule=MAT001&next=%2Fbooks%2F3", None)
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/books/3");
        let token = session_cookie_value(&response).expect("session cookie");

        let page: BookListResponse = json_body(app.get("/", Some(&token)).await).await;
        let student = page.logged_student.expect("logged in");
        assert_eq!(student.matricule, "MAT001");
        assert_eq!(page.messages[0].text, "Logged in as Student MAT001.");

        // messages are shown once
        let page: BookListResponse = json_body(app.get("/", Some(&token)).await).await;
        assert!(page.messages.is_empty());
    }

    #[tokio::test]
    async fn test_login_rotates_the_token() {
        let app = TestApp::new().await;
        app.env.create_student("MAT001").await.unwrap();

        let first = app.login("MAT001").await;
        let response = app.post_form("/login", "matricule=MAT001", Some(&first)).await;
        let second = session_cookie_value(&response).expect("session cookie");
        assert_ne!(first, second);

        let page: BookListResponse = json_body(app.get("/", Some(&first)).await).await;
        assert!(page.logged_student.is_none());
    }

    #[tokio::test]
    async fn test_login_with_unsafe_next_goes_to_catalogue() {
        let app = TestApp::new().await;
        app.env.create_student("MAT001").await.unwrap();

        let response = app
            .post_form("/login", "matricule=MAT001&next=%2F%2Fevil.com", None)
            .await;
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_unknown_matricule_redisplays_login() {
        let app = TestApp::new().await;

        let response = app
            .post_form("/login", "matricule=NOPE&next=%2Fbooks%2F1", None)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(session_cookie_value(&response).is_none());

        let page: LoginPageResponse = json_body(response).await;
        assert_eq!(page.next_url, "/books/1");
        assert!(page.logged_student.is_none());
        assert_eq!(page.messages.len(), 1);
        assert_eq!(page.messages[0].text, UNKNOWN_MATRICULE_MESSAGE);
    }

    #[tokio::test]
    async fn test_login_page_validates_next() {
        let app = TestApp::new().await;

        let page: LoginPageResponse =
            json_body(app.get("/login?next=https%3A%2F%2Fevil.com%2F", None).await).await;
        assert_eq!(page.next_url, "/");

        let page: LoginPageResponse = json_body(
            app.get("/login?next=https%3A%2F%2Flibrary.example.org%2Fbooks%2F2", None)
                .await,
        )
        .await;
        assert_eq!(page.next_url, "https://library.example.org/books/2");
    }

    #[tokio::test]
    async fn test_logout_clears_identity() {
        let app = TestApp::new().await;
        app.env.create_student("MAT001").await.unwrap();
        let token = app.login("MAT001").await;

        let response = app.post_form("/logout", "", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let page: BookListResponse = json_body(app.get("/", Some(&token)).await).await;
        assert!(page.logged_student.is_none());
        let texts: Vec<_> = page.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["Logged in as Student MAT001.", LOGGED_OUT_MESSAGE]);
    }

    #[tokio::test]
    async fn test_anonymous_logout_is_harmless() {
        let app = TestApp::new().await;

        let response = app.post_form("/logout", "", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(session_cookie_value(&response).is_some());
    }

    #[tokio::test]
    async fn test_expired_sessions_are_purged_by_new_visitors() {
        let app = TestApp::new().await;
        let repo = SessionRepository::new(app.env.connection.clone());

        for _ in 0..3 {
            let mut stale = Session::new_anonymous();
            stale.created_at = Utc::now() - Duration::days(30);
            repo.store_session(&stale).await.unwrap();
        }

        for _ in 0..5 {
            app.post_form("/logout", "", None).await;
        }

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(app.env.connection.pool())
            .await
            .unwrap();
        assert_eq!(remaining, 5);
    }
}
