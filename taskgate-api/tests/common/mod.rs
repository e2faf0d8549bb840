//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An application over the in-memory store
//! - User registration and login helpers
//! - Token minting for expiry and forgery cases
//! - A request helper returning status, headers, and parsed JSON

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use taskgate_api::app::{build_router, AppState};
use taskgate_api::config::Config;
use taskgate_shared::auth::jwt::{SigningSecret, TokenIssuer};
use taskgate_shared::store::{MemoryStore, Storage};
use tower::Service as _;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: axum::Router,
    pub state: AppState,
}

/// Decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestContext {
    /// Creates a context with a fresh in-memory store
    pub fn new() -> anyhow::Result<Self> {
        Self::with_vars(&[])
    }

    /// Creates a context with extra configuration variables
    pub fn with_vars(extra: &[(&str, &str)]) -> anyhow::Result<Self> {
        Self::with_store(Arc::new(MemoryStore::new()), extra)
    }

    /// Creates a context over `store` with extra configuration variables
    pub fn with_store(store: Arc<dyn Storage>, extra: &[(&str, &str)]) -> anyhow::Result<Self> {
        let mut vars: HashMap<String, String> = [
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", TEST_SECRET),
            ("PASSWORD_HASH_MEMORY_KIB", "19456"),
            ("PASSWORD_HASH_ITERATIONS", "2"),
            ("PASSWORD_HASH_PARALLELISM", "1"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in extra {
            vars.insert(k.to_string(), v.to_string());
        }

        let config = Config::from_lookup(|name| vars.get(name).cloned())?;
        let state = AppState::new(store, config)?;
        let app = build_router(state.clone());

        Ok(TestContext { app, state })
    }

    /// Sends a request, optionally with a raw `Authorization` value and JSON body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.call(request).await
    }

    /// Sends a prepared request
    pub async fn call(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().call(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Sends a request carrying `token` as a bearer credential
    pub async fn send_authed(
        &self,
        method: &str,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> TestResponse {
        let header = format!("Bearer {}", token);
        self.send(method, uri, Some(&header), body).await
    }

    /// Registers a user with [`TEST_PASSWORD`]
    pub async fn register(&self, email: &str) -> TestResponse {
        self.send(
            "POST",
            "/v1/users",
            None,
            Some(json!({
                "first_name": "Test",
                "last_name": "User",
                "email": email,
                "password": TEST_PASSWORD,
            })),
        )
        .await
    }

    /// Logs in and returns the full response
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/v1/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Registers `email` and returns a fresh token for it
    pub async fn register_and_login(&self, email: &str) -> String {
        let registered = self.register(email).await;
        assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.body);

        let login = self.login(email, TEST_PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.body);

        login.body["token"].as_str().unwrap().to_string()
    }

    /// Signs a token for `email` as if issued `seconds_ago` seconds in the past
    pub fn token_issued_ago(&self, email: &str, seconds_ago: i64) -> String {
        let issuer = TokenIssuer::new(
            &self.state.config.jwt.secret,
            Duration::seconds(self.state.config.jwt.ttl_seconds),
        );
        issuer
            .issue_at(email, Utc::now() - Duration::seconds(seconds_ago))
            .unwrap()
            .token
    }

    /// Signs a token for `email` with a different secret
    pub fn forged_token(&self, email: &str) -> String {
        let secret = SigningSecret::new("some-other-secret-that-is-32-bytes-long").unwrap();
        TokenIssuer::new(&secret, Duration::hours(1))
            .issue_for(email)
            .unwrap()
            .token
    }
}
