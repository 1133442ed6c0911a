use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use time::{Duration, OffsetDateTime};

use crate::auth::SessionTokens;

pub const SESSION_COOKIE_NAME: &str = "session_token";
pub const CSRF_COOKIE_NAME: &str = "csrf_token";
pub const CSRF_HEADER_NAME: &str = "X-CSRF-Token";

/// Both cookies live for 24 hours from login.
const COOKIE_LIFETIME: Duration = Duration::hours(24);

fn build_cookie(
    name: &'static str,
    value: String,
    http_only: bool,
    expires: OffsetDateTime,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(http_only)
        .same_site(SameSite::Lax)
        .expires(expires)
        .build()
}

/// The session token is HTTP-only; the CSRF token must stay readable so the
/// client can echo it in the `X-CSRF-Token` header.
pub fn add_session_cookies(jar: CookieJar, tokens: &SessionTokens) -> CookieJar {
    let expires = OffsetDateTime::now_utc() + COOKIE_LIFETIME;
    jar.add(build_cookie(
        SESSION_COOKIE_NAME,
        tokens.session_token.clone(),
        true,
        expires,
    ))
    .add(build_cookie(
        CSRF_COOKIE_NAME,
        tokens.csrf_token.clone(),
        false,
        expires,
    ))
}

/// Reissues both cookies empty with an expiry in the past.
pub fn expire_session_cookies(jar: CookieJar) -> CookieJar {
    let expired = OffsetDateTime::now_utc() - COOKIE_LIFETIME;
    jar.add(build_cookie(SESSION_COOKIE_NAME, String::new(), true, expired))
        .add(build_cookie(CSRF_COOKIE_NAME, String::new(), false, expired))
}

pub fn get_session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}
