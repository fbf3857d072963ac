//! In-process test harness: the full router over the in-memory store,
//! driven with `tower::ServiceExt::oneshot`. Each test builds its own app
//! so suites stay isolated and need no running database.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use wtwr_api::config::AppConfig;
use wtwr_api::routes;
use wtwr_api::state::AppState;
use wtwr_api::store::memory::MemoryStore;

/// Password used by every test account.
pub const PASSWORD: &str = "strong-password-1";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::from_env();
    config.security.jwt_secret = "test-secret".to_string();
    // minimum bcrypt cost keeps the suite fast
    config.security.bcrypt_cost = 4;
    config
}

pub fn test_app() -> (Router, AppConfig) {
    let config = test_config();
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(config.clone(), store.clone(), store);
    (routes::app(state), config)
}

/// Fire one request and return (status, parsed JSON body).
pub async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .with_context(|| format!("non-JSON body for {}: {:?}", status, bytes))?
    };
    Ok((status, body))
}

/// Request without a body.
pub fn request(method: &str, path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Request with a raw `Authorization` header value, for malformed-header
/// cases the `request` helper cannot express.
pub fn request_with_authorization(method: &str, path: &str, authorization: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap()
}

/// JSON-body request.
pub fn json_request(method: &str, path: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Raw-body request, for malformed payloads.
pub fn raw_request(method: &str, path: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Create an account and return the signup response body.
pub async fn signup(app: &Router, email: &str) -> Result<Value> {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/signup",
            None,
            &json!({
                "name": "Test User",
                "avatar": "https://example.com/avatar.png",
                "email": email,
                "password": PASSWORD,
            }),
        ),
    )
    .await?;
    anyhow::ensure!(
        status == StatusCode::CREATED,
        "signup returned {}: {}",
        status,
        body
    );
    Ok(body)
}

/// Sign in with the shared test password and return the bearer token.
pub async fn signin(app: &Router, email: &str) -> Result<String> {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/signin",
            None,
            &json!({ "email": email, "password": PASSWORD }),
        ),
    )
    .await?;
    anyhow::ensure!(
        status == StatusCode::OK,
        "signin returned {}: {}",
        status,
        body
    );
    body["token"]
        .as_str()
        .map(str::to_string)
        .context("token missing from signin response")
}

/// Signup followed by signin.
pub async fn register(app: &Router, email: &str) -> Result<String> {
    signup(app, email).await?;
    signin(app, email).await
}

/// Create a clothing item and return its body.
pub async fn create_item(app: &Router, token: &str, name: &str) -> Result<Value> {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/items",
            Some(token),
            &json!({
                "name": name,
                "weather": "cold",
                "imageUrl": "https://example.com/item.png",
            }),
        ),
    )
    .await?;
    anyhow::ensure!(
        status == StatusCode::CREATED,
        "create item returned {}: {}",
        status,
        body
    );
    Ok(body)
}

/// The authenticated user's record.
pub async fn current_user(app: &Router, token: &str) -> Result<Value> {
    let (status, body) = send(app, request("GET", "/users/me", Some(token))).await?;
    anyhow::ensure!(
        status == StatusCode::OK,
        "/users/me returned {}: {}",
        status,
        body
    );
    Ok(body)
}
