use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Sessions older than this are treated as absent unless configured otherwise
pub const DEFAULT_SESSION_MAX_AGE_DAYS: u32 = 14;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    /// None while the visitor is anonymous
    pub student_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn generate_token() -> String {
        Uuid::new_v4().simple().to_string()
    }

    pub fn new_anonymous() -> Self {
        Self {
            token: Self::generate_token(),
            student_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn new_for_student(student_id: i64) -> Self {
        Self {
            token: Self::generate_token(),
            student_id: Some(student_id),
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        self.created_at + max_age <= now
    }
}
