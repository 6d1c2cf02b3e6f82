//! Shared helpers for driving the router in-process

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use campus_portal::api::{create_router, AppState};
use campus_portal::auth::PasswordHasher;
use campus_portal::config::{AdminAccount, Config};
use campus_portal::store::Stores;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";
pub const ADMIN_EMAIL: &str = "admin@university.edu";
pub const ADMIN_PASSWORD: &str = "admin-pass";

/// Config with a signing secret, the cheapest bcrypt cost and one admin
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.jwt_secret = Some(SECRET.to_string());
    config.auth.bcrypt_cost = 4;

    let hasher = PasswordHasher::new(4).unwrap();
    config.auth.admins.push(AdminAccount {
        id: Some("admin-1".to_string()),
        email: ADMIN_EMAIL.to_string(),
        name: "Portal Admin".to_string(),
        password_hash: hasher.hash(ADMIN_PASSWORD).unwrap(),
    });
    config
}

pub fn app_with(config: Config) -> Router {
    let state = AppState::new(config, Stores::memory()).unwrap();
    create_router(Arc::new(state))
}

pub fn app() -> Router {
    app_with(test_config())
}

/// Send one request and return the status with the decoded JSON body
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    send_request(app, request).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub fn registration(email: &str, roll_no: &str) -> Value {
    json!({
        "name": "Meera Iyer",
        "email": email,
        "password": "password123",
        "rollNo": roll_no,
        "department": "Computer Science",
        "year": 2,
        "contact": "9876543210",
        "semester": 3
    })
}

/// Register a student and return their token
pub async fn register(app: &Router, email: &str, roll_no: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(registration(email, roll_no)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

pub async fn admin_token(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "admin login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}
