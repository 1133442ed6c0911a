use axum::{
    extract::{FromRef, FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::AuthService;
use crate::error::AppError;
use crate::session::{get_session_token, CSRF_HEADER_NAME};

/// The identity claim of a protected request.
#[derive(Debug, Deserialize)]
struct UsernameClaim {
    #[serde(default)]
    username: String,
}

/// The session cookie and CSRF header a request presents.
struct PresentedTokens {
    session_token: Option<String>,
    csrf_token: Option<String>,
}

impl PresentedTokens {
    fn from_parts(parts: &Parts) -> Self {
        let jar = CookieJar::from_headers(&parts.headers);
        let csrf_token = parts
            .headers
            .get(CSRF_HEADER_NAME)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Self {
            session_token: get_session_token(&jar),
            csrf_token,
        }
    }
}

async fn query_username<S>(parts: &mut Parts, state: &S) -> Result<String, AppError>
where
    S: Send + Sync,
{
    let Query(claim) = Query::<UsernameClaim>::from_request_parts(parts, state)
        .await
        .map_err(|_| AppError::Unauthorized)?;
    Ok(claim.username)
}

async fn authorize(
    auth: &AuthService,
    username: String,
    tokens: PresentedTokens,
) -> Result<AuthUser, AppError> {
    let session = auth
        .authorize(
            &username,
            tokens.session_token.as_deref(),
            tokens.csrf_token.as_deref(),
        )
        .await?;

    Ok(AuthUser {
        id: session.user_id,
        username,
    })
}

/// A request that passed authorization: the claimed username has a live
/// session whose tokens match the `session_token` cookie and the
/// `X-CSRF-Token` header.
///
/// The claim is read from the query string, leaving the body to other
/// extractors.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthService::from_ref(state);
        let username = query_username(parts, state).await?;
        let tokens = PresentedTokens::from_parts(parts);

        authorize(&auth, username, tokens).await
    }
}

/// [`AuthUser`] for form posts. A non-empty `username` in an url-encoded
/// body wins over the query string. Consumes the body, so it must be the
/// handler's last argument.
#[derive(Clone, Debug)]
pub struct FormAuthUser(pub AuthUser);

impl<S> FromRequest<S> for FormAuthUser
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthService::from_ref(state);
        let (mut parts, body) = req.into_parts();
        let query_claim = query_username(&mut parts, state).await?;
        let tokens = PresentedTokens::from_parts(&parts);

        // Form rejects bodies that are not url-encoded
        let request = Request::from_parts(parts, body);
        let body_claim = Form::<UsernameClaim>::from_request(request, state)
            .await
            .ok()
            .map(|Form(claim)| claim.username)
            .filter(|username| !username.is_empty());
        let username = body_claim.unwrap_or(query_claim);

        authorize(&auth, username, tokens).await.map(FormAuthUser)
    }
}
