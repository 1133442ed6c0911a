#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, request, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use gymlog::app::{create_app, seed_catalog};
use gymlog::db::{create_memory_pool, DbPool};
use gymlog::migrations::run_migrations_for_tests;
use gymlog::session::{CSRF_COOKIE_NAME, CSRF_HEADER_NAME, SESSION_COOKIE_NAME};
use gymlog::storage::{MemoryStorage, SqliteStorage, Storage};

pub fn setup_test_db() -> DbPool {
    let pool = create_memory_pool().expect("Failed to create test database");
    run_migrations_for_tests(&pool).expect("Failed to run migrations");
    pool
}

/// A migrated, seeded in-memory SQLite engine.
pub fn sqlite_storage() -> Arc<dyn Storage> {
    let storage: Arc<dyn Storage> = Arc::new(SqliteStorage::new(setup_test_db()));
    seed_catalog(storage.as_ref()).expect("Failed to seed exercises");
    storage
}

pub fn memory_storage() -> Arc<dyn Storage> {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    seed_catalog(storage.as_ref()).expect("Failed to seed exercises");
    storage
}

pub fn create_test_app(storage: Arc<dyn Storage>) -> Router {
    create_app(storage)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&body).to_string()
}

pub fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn register(app: &Router, username: &str, email: &str, password: &str) -> StatusCode {
    let body = format!("username={username}&email={email}&password={password}");
    send(app, form_request("/register", &body)).await.status()
}

/// The cookie values handed out by a successful login.
#[derive(Debug, Clone)]
pub struct LoginCookies {
    pub session_token: String,
    pub csrf_token: String,
}

/// Finds `name=value` among the response's Set-Cookie headers.
pub fn set_cookie_header<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&prefix))
}

pub fn cookie_value(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.split_once('='))
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}

pub async fn login(app: &Router, username: &str, password: &str) -> LoginCookies {
    let body = format!("username={username}&password={password}");
    let response = send(app, form_request("/login", &body)).await;
    assert_eq!(response.status(), StatusCode::OK, "login failed");

    LoginCookies {
        session_token: cookie_value(set_cookie_header(&response, SESSION_COOKIE_NAME).unwrap()),
        csrf_token: cookie_value(set_cookie_header(&response, CSRF_COOKIE_NAME).unwrap()),
    }
}

/// Registers and logs in a user in one step.
pub async fn register_and_login(app: &Router, username: &str, password: &str) -> LoginCookies {
    let email = format!("{username}@example.com");
    assert_eq!(
        register(app, username, &email, password).await,
        StatusCode::OK
    );
    login(app, username, password).await
}

/// A request builder carrying the session cookie and CSRF header.
pub fn authed(method: &str, uri: &str, cookies: &LoginCookies) -> request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::COOKIE,
            format!(
                "{SESSION_COOKIE_NAME}={}; {CSRF_COOKIE_NAME}={}",
                cookies.session_token, cookies.csrf_token
            ),
        )
        .header(CSRF_HEADER_NAME, &cookies.csrf_token)
}
