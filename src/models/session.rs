use chrono::{DateTime, Utc};
use rusqlite::Row;

use super::FromSqliteRow;

/// The live session of one user: a session token paired with a CSRF token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub user_id: i64,
    pub session_token: String,
    pub csrf_token: String,
    pub created_at: DateTime<Utc>,
}

impl FromSqliteRow for UserSession {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get("user_id")?,
            session_token: row.get("session_token")?,
            csrf_token: row.get("csrf_token")?,
            created_at: row.get("created_at")?,
        })
    }
}
