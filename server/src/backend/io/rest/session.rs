//! Session cookie handling and the per-request identity context.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        header::{COOKIE, HOST, REFERER, SET_COOKIE},
        request::Parts,
        HeaderMap,
    },
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use shared::MessageLevel;

use crate::backend::domain::models::student::Student;
use crate::backend::io::rest::ApiError;
use crate::backend::AppState;

pub const SESSION_COOKIE: &str = "library_session";

/// Identity of the caller, resolved once per request and handed to handlers
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    /// Session token from the cookie, if the client sent one
    pub token: Option<String>,
    /// Logged-in student; None for anonymous visitors
    pub student: Option<Student>,
    /// Host header, used to validate redirect targets
    pub host: Option<String>,
    pub referer: Option<String>,
}

#[async_trait]
impl FromRequestParts<AppState> for SessionContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token_from_headers(&parts.headers);
        let student = state.identity_service.resolve(token.as_deref()).await?;

        Ok(SessionContext {
            token,
            student,
            host: header_string(&parts.headers, HOST),
            referer: header_string(&parts.headers, REFERER),
        })
    }
}

fn header_string(headers: &HeaderMap, name: axum::http::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Find the session token among all `Cookie` headers
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value binding the browser to a session
pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

/// Queue a status message on the caller's session and redirect (303).
/// Visitors without a usable session get a fresh anonymous one, so the
/// message survives the redirect.
pub async fn redirect_with_message(
    state: &AppState,
    session: &SessionContext,
    level: MessageLevel,
    text: impl Into<String>,
    location: &str,
) -> Result<Response, ApiError> {
    let (token, created) = state
        .identity_service
        .ensure_session(session.token.as_deref())
        .await?;
    state.identity_service.push_message(&token, level, text).await?;

    Ok(redirect_response(location, created.then_some(token.as_str())))
}

/// 303 redirect, optionally binding the browser to a session
pub fn redirect_response(location: &str, token: Option<&str>) -> Response {
    let redirect = Redirect::to(location);
    match token {
        Some(token) => (AppendHeaders([(SET_COOKIE, session_cookie(token))]), redirect).into_response(),
        None => redirect.into_response(),
    }
}
