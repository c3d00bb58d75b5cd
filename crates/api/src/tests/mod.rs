//! Handler tests driving the real router over the in-memory store and
//! the real JWT verifier.


use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{Map, Value};
use tower::ServiceExt;

use vitae_core::identity::jwt::{AccessClaims, JwtIdentity};
use vitae_core::store::memory::MemoryStore;

use crate::config::{AppConfig, StoreBackend};
use crate::routes::build_router;
use crate::state::AppState;

const TEST_JWT_SECRET: &str = "test-jwt-secret";
const TEST_ADMIN_SECRET: &str = "test-admin-secret";

fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        store_backend: StoreBackend::Memory,
        database_url: None,
        db_max_connections: 1,
        db_min_connections: 1,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        admin_secret: TEST_ADMIN_SECRET.to_string(),
        waitlist_dedup: false,
        max_body_bytes: 1024 * 1024,
        log_level: "debug".to_string(),
    }
}

/// Router plus a handle on the store it writes to.
fn test_app(config: AppConfig) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let identity = Arc::new(JwtIdentity::new(&config.jwt_secret, store.clone()));
    let state = AppState::new(store.clone(), identity, config);
    (build_router(state), store)
}

fn admin_token(uid: &str, email: &str) -> String {
    token(uid, email, true)
}

fn token(uid: &str, email: &str, admin: bool) -> String {
    let now = Utc::now();
    let claims = AccessClaims {
        sub: uid.to_string(),
        email: email.to_string(),
        admin,
        exp: (now + Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("token encoding")
}

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("json object")
}

/// Send one request through the router and decode the JSON response.
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

#[tokio::test]
async fn health_and_ping_respond() {
    let (app, _store) = test_app(test_config());

    let (status, body) = send(&app, "GET", "/health", None, &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, "GET", "/v1/ping", None, &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
