use axum::{
    extract::{FromRef, State},
    Form, Json,
};
use axum_extra::extract::CookieJar;

use super::MessageResponse;
use crate::auth::AuthService;
use crate::error::Result;
use crate::middleware::FormAuthUser;
use crate::models::{LoginCredentials, RegisterForm};
use crate::session::{add_session_cookies, expire_session_cookies};

#[derive(Clone, FromRef)]
pub struct AuthState {
    pub auth: AuthService,
}

pub async fn register(
    State(state): State<AuthState>,
    Form(form): Form<RegisterForm>,
) -> Result<Json<MessageResponse>> {
    state.auth.register(form).await?;

    Ok(Json(MessageResponse {
        message: "User registered successfully",
    }))
}

pub async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    Form(credentials): Form<LoginCredentials>,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    let tokens = state.auth.login(credentials).await?;
    let jar = add_session_cookies(jar, &tokens);

    Ok((
        jar,
        Json(MessageResponse {
            message: "Login successful",
        }),
    ))
}

pub async fn logout(
    State(state): State<AuthState>,
    jar: CookieJar,
    FormAuthUser(auth_user): FormAuthUser,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    state.auth.logout(auth_user.id).await?;
    let jar = expire_session_cookies(jar);

    Ok((
        jar,
        Json(MessageResponse {
            message: "Logout successful",
        }),
    ))
}
