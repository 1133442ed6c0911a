use std::sync::Arc;

use super::run_blocking;
use crate::error::{AppError, Result};
use crate::models::{NewUser, User, UserSession};
use crate::storage::Storage;

#[derive(Clone)]
pub struct UserRepository {
    storage: Arc<dyn Storage>,
}

impl UserRepository {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Exact, case-sensitive lookup by the unique username.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let username = username.to_string();
        run_blocking(&self.storage, move |s| s.find_user(&username)).await
    }

    pub async fn save_user(&self, user: NewUser) -> Result<User> {
        run_blocking(&self.storage, move |s| s.save_user(&user)).await
    }

    pub async fn save_session(
        &self,
        user_id: i64,
        session_token: &str,
        csrf_token: &str,
    ) -> Result<()> {
        let session_token = session_token.to_string();
        let csrf_token = csrf_token.to_string();
        run_blocking(&self.storage, move |s| {
            s.save_session(user_id, &session_token, &csrf_token)
        })
        .await
    }

    pub async fn delete_session(&self, user_id: i64) -> Result<()> {
        run_blocking(&self.storage, move |s| s.delete_session(user_id)).await
    }

    /// Resolves username → user → live session.
    pub async fn user_session(&self, username: &str) -> Result<UserSession> {
        let user = self
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        run_blocking(&self.storage, move |s| s.user_session(user.id))
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
    }
}
