use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use shared::{FlashMessage, MessageLevel};
use sqlx::Row;

use crate::backend::domain::models::session::Session;
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::SessionStorage;

/// Repository for login sessions and their queued flash messages
#[derive(Clone)]
pub struct SessionRepository {
    db: DbConnection,
}

impl SessionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Fixed-width UTC form, so stored timestamps order correctly as text
    fn timestamp(at: DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

#[async_trait]
impl SessionStorage for SessionRepository {
    async fn store_session(&self, session: &Session) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token, student_id, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&session.token)
        .bind(session.student_id)
        .bind(Self::timestamp(session.created_at))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<Session>> {
        let row = sqlx::query(
            r#"
            SELECT token, student_id, created_at
            FROM sessions
            WHERE token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(r) => {
                let created_at: String = r.get("created_at");
                Ok(Some(Session {
                    token: r.get("token"),
                    student_id: r.get("student_id"),
                    created_at: DateTime::parse_from_rfc3339(&created_at)
                        .context("Invalid created_at in sessions")?
                        .with_timezone(&Utc),
                }))
            }
            None => Ok(None),
        }
    }

    async fn clear_session_student(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE sessions SET student_id = NULL WHERE token = ?")
            .bind(token)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_session(&self, token: &str) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query("DELETE FROM flash_messages WHERE session_token = ?")
            .bind(token)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_sessions_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let cutoff = Self::timestamp(cutoff);
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            DELETE FROM flash_messages
            WHERE session_token IN (SELECT token FROM sessions WHERE created_at < ?)
            "#,
        )
        .bind(&cutoff)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM sessions WHERE created_at < ?")
            .bind(&cutoff)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn push_message(&self, token: &str, message: &FlashMessage) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO flash_messages (session_token, level, text)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(token)
        .bind(message.level.as_str())
        .bind(&message.text)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn take_messages(&self, token: &str) -> Result<Vec<FlashMessage>> {
        // Single statement so reading and draining cannot interleave with another request
        let rows = sqlx::query(
            r#"
            DELETE FROM flash_messages
            WHERE session_token = ?
            RETURNING id, level, text
            "#,
        )
        .bind(token)
        .fetch_all(self.db.pool())
        .await?;

        let mut queued: Vec<(i64, FlashMessage)> = rows
            .iter()
            .map(|row| {
                (
                    row.get("id"),
                    FlashMessage {
                        level: MessageLevel::parse(row.get::<&str, _>("level")),
                        text: row.get("text"),
                    },
                )
            })
            .collect();

        // RETURNING does not guarantee row order
        queued.sort_by_key(|(id, _)| *id);

        Ok(queued.into_iter().map(|(_, message)| message).collect())
    }
}
