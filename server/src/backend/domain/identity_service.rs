//! Session and identity resolution.
//!
//! A session token is an opaque string held in a cookie. It maps to a
//! stored [`Session`], which may or may not be bound to a student. Anonymous
//! sessions exist so that status messages can be queued for visitors who are
//! not logged in.
//!
//! Sessions expire a fixed time after creation. An expired session resolves
//! like an unknown token, and expired rows are purged whenever a new session
//! is stored.

use anyhow::Result;
use chrono::{Duration, Utc};
use shared::{FlashMessage, MessageLevel};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::backend::domain::commands::identity::{LoginCommand, LoginResult};
use crate::backend::domain::errors::{LibraryError, LibraryResult};
use crate::backend::domain::models::session::{Session, DEFAULT_SESSION_MAX_AGE_DAYS};
use crate::backend::domain::models::student::Student;
use crate::backend::storage::{
    DbConnection, SessionRepository, SessionStorage, StudentRepository, StudentStorage,
};

/// Service mapping session tokens to students
#[derive(Clone)]
pub struct IdentityService {
    sessions: Arc<dyn SessionStorage>,
    students: Arc<dyn StudentStorage>,
    max_age: Duration,
}

impl IdentityService {
    pub fn new(db: DbConnection) -> Self {
        Self::with_storage(
            Arc::new(SessionRepository::new(db.clone())),
            Arc::new(StudentRepository::new(db)),
        )
    }

    pub fn with_storage(sessions: Arc<dyn SessionStorage>, students: Arc<dyn StudentStorage>) -> Self {
        Self {
            sessions,
            students,
            max_age: Duration::days(i64::from(DEFAULT_SESSION_MAX_AGE_DAYS)),
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// The stored session for `token`, unless it has expired
    async fn live_session(&self, token: &str) -> Result<Option<Session>> {
        let session = self.sessions.get_session(token).await?;
        Ok(session.filter(|s| !s.is_expired(self.max_age, Utc::now())))
    }

    async fn purge_expired(&self) -> Result<()> {
        let removed = self
            .sessions
            .delete_sessions_created_before(Utc::now() - self.max_age)
            .await?;
        if removed > 0 {
            debug!("Purged {} expired sessions", removed);
        }
        Ok(())
    }

    /// Resolve a session token to its student.
    /// No token, an unknown or expired token, or an anonymous session all yield None.
    pub async fn resolve(&self, token: Option<&str>) -> Result<Option<Student>> {
        let Some(token) = token else {
            return Ok(None);
        };

        let student_id = match self.live_session(token).await? {
            Some(Session { student_id: Some(id), .. }) => id,
            _ => return Ok(None),
        };

        let student = self.students.get_student(student_id).await?;
        if student.is_none() {
            warn!("Session refers to missing student {}", student_id);
        }
        Ok(student)
    }

    /// Log in by exact matricule match.
    ///
    /// On success a fresh session bound to the student replaces the
    /// caller's previous session, so the token changes on login.
    pub async fn login(&self, command: LoginCommand) -> LibraryResult<LoginResult> {
        let matricule = command.matricule.trim();

        let student = match self.students.get_student_by_matricule(matricule).await? {
            Some(student) => student,
            None => {
                info!("Login failed for matricule {:?}", matricule);
                return Err(LibraryError::StudentNotFound(matricule.to_string()));
            }
        };

        if let Some(previous) = command.session_token.as_deref() {
            self.sessions.delete_session(previous).await?;
        }

        self.purge_expired().await?;
        let session = Session::new_for_student(student.id);
        self.sessions.store_session(&session).await?;

        info!("Student {} logged in", student.matricule);
        Ok(LoginResult {
            student,
            session_token: session.token,
        })
    }

    /// Clear the identity of a session. Unknown or missing tokens are ignored.
    pub async fn logout(&self, token: Option<&str>) -> Result<()> {
        if let Some(token) = token {
            if self.sessions.clear_session_student(token).await? {
                info!("Session logged out");
            }
        }
        Ok(())
    }

    /// Return a usable session token, creating an anonymous session when the
    /// caller has none or presents one that is unknown or expired.
    /// The flag is true when a new session was created.
    pub async fn ensure_session(&self, token: Option<&str>) -> Result<(String, bool)> {
        if let Some(token) = token {
            if self.live_session(token).await?.is_some() {
                return Ok((token.to_string(), false));
            }
        }

        self.purge_expired().await?;
        let session = Session::new_anonymous();
        self.sessions.store_session(&session).await?;
        debug!("Created anonymous session");
        Ok((session.token, true))
    }

    pub async fn push_message(&self, token: &str, level: MessageLevel, text: impl Into<String>) -> Result<()> {
        let message = FlashMessage {
            level,
            text: text.into(),
        };
        self.sessions.push_message(token, &message).await
    }

    /// Drain the queued messages of a session. No token means no messages.
    pub async fn take_messages(&self, token: Option<&str>) -> Result<Vec<FlashMessage>> {
        match token {
            Some(token) => self.sessions.take_messages(token).await,
            None => Ok(Vec::new()),
        }
    }
}
