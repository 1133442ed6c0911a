//! Registration, login, authorization and logout.
//!
//! A logged-in user has exactly one session row holding two tokens: the
//! session token (sent back as an HTTP-only cookie) and the CSRF token (a
//! readable cookie the client echoes in the `X-CSRF-Token` header).
//!
//! Authorization checks the tokens against the session of the username the
//! client *claims*; the claim itself is not bound to the cookie beyond token
//! equality.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand_core::{OsRng, RngCore};
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::models::{LoginCredentials, NewUser, RegisterForm, User, UserSession};
use crate::repositories::UserRepository;

/// Raw bytes of entropy in each session and CSRF token.
pub const TOKEN_BYTES: usize = 32;

// Argon2id cost: 19 MiB, 2 passes, 1 lane
const ARGON2_MEMORY_KIB: u32 = 19_456;
const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;

fn argon2() -> Result<Argon2<'static>> {
    let params = Params::new(
        ARGON2_MEMORY_KIB,
        ARGON2_ITERATIONS,
        ARGON2_PARALLELISM,
        None,
    )
    .map_err(|_| AppError::PasswordHash)?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AppError::PasswordHash)?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AppError::PasswordHash)?;
    Ok(argon2()?
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// A fresh random token, URL-safe base64 without padding.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn tokens_match(presented: Option<&str>, stored: &str) -> bool {
    match presented {
        Some(presented) if !presented.is_empty() && !stored.is_empty() => {
            presented.as_bytes().ct_eq(stored.as_bytes()).into()
        }
        _ => false,
    }
}

/// The token pair issued at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub user_id: i64,
    pub session_token: String,
    pub csrf_token: String,
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
}

impl AuthService {
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    pub async fn register(&self, form: RegisterForm) -> Result<User> {
        if form.username.is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }
        if form.password.is_empty() {
            return Err(AppError::Validation("Password is required".to_string()));
        }

        if self
            .user_repo
            .find_by_username(&form.username)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists(
                "Username already exists".to_string(),
            ));
        }

        let password = form.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;

        let user = self
            .user_repo
            .save_user(NewUser {
                username: form.username,
                email: form.email,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Verifies the credentials and replaces the user's session with a new one.
    pub async fn login(&self, credentials: LoginCredentials) -> Result<SessionTokens> {
        let user = self
            .user_repo
            .find_by_username(&credentials.username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let password = credentials.password;
        let hash = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;
        if !verified {
            tracing::debug!(username = %user.username, "Login rejected: incorrect password");
            return Err(AppError::IncorrectPassword);
        }

        let tokens = SessionTokens {
            user_id: user.id,
            session_token: generate_token(),
            csrf_token: generate_token(),
        };
        self.user_repo
            .save_session(user.id, &tokens.session_token, &tokens.csrf_token)
            .await?;

        tracing::info!(user_id = user.id, "User logged in");
        Ok(tokens)
    }

    /// Checks the presented session cookie and CSRF header against the stored
    /// session of `username`. Every failure is the same opaque `Unauthorized`.
    pub async fn authorize(
        &self,
        username: &str,
        session_token: Option<&str>,
        csrf_token: Option<&str>,
    ) -> Result<UserSession> {
        let session = match self.user_repo.user_session(username).await {
            Ok(session) => session,
            Err(AppError::NotFound(_)) => return Err(AppError::Unauthorized),
            Err(e) => return Err(e),
        };

        // Evaluate both checks so the outcome does not depend on which failed
        let session_ok = tokens_match(session_token, &session.session_token);
        let csrf_ok = tokens_match(csrf_token, &session.csrf_token);
        if !(session_ok && csrf_ok) {
            return Err(AppError::Unauthorized);
        }

        Ok(session)
    }

    pub async fn logout(&self, user_id: i64) -> Result<()> {
        self.user_repo.delete_session(user_id).await?;
        tracing::info!(user_id, "User logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_is_url_safe_without_padding() {
        let token = generate_token();
        // 32 bytes encode to 43 unpadded base64 characters
        assert_eq!(token.len(), 43);
        assert!(!token.contains('='));
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(URL_SAFE_NO_PAD.decode(&token).unwrap().len(), TOKEN_BYTES);
    }

    #[test]
    fn test_generate_token_is_random() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("pw123").unwrap();
        assert_ne!(hash, "pw123");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("pw123", &hash).unwrap());
        assert!(!verify_password("pw124", &hash).unwrap());
    }

    #[test]
    fn test_hash_password_is_salted() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_verify_password_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("pw", "not-a-hash"),
            Err(AppError::PasswordHash)
        ));
    }

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match(Some("abc"), "abc"));
        assert!(!tokens_match(Some("abd"), "abc"));
        assert!(!tokens_match(Some("ab"), "abc"));
        assert!(!tokens_match(None, "abc"));
        assert!(!tokens_match(Some(""), ""));
    }
}
