//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use sitegate_api::{AppState, build_app};
use sitegate_auth::TokenIssuer;
use sitegate_core::config::AppConfig;
use sitegate_entity::user::Role;
use sitegate_entity::visitor::{VisitorKey, VisitorRecord};
use sitegate_service::presence::{MemoryVisitorStore, VisitorStore};

pub const TEST_JWT_SECRET: &str = "integration-test-jwt-secret";
pub const TEST_CSRF_SECRET: &str = "integration-test-csrf-secret";

/// Configuration used by every integration test
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = TEST_JWT_SECRET.to_string();
    config.csrf.secret = TEST_CSRF_SECRET.to_string();
    config.server.shutdown_grace_seconds = 5;
    config
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for inspecting the hub and the visitor store
    pub state: AppState,
    /// Application config
    pub config: AppConfig,
    issuer: TokenIssuer,
}

impl TestApp {
    /// Create a test application backed by the in-memory visitor store
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryVisitorStore::new()))
    }

    /// Create a test application around an explicit visitor store
    pub fn with_store(store: Arc<dyn VisitorStore>) -> Self {
        Self::with_config(test_config(), store)
    }

    /// Create a test application with custom configuration
    pub fn with_config(config: AppConfig, store: Arc<dyn VisitorStore>) -> Self {
        let state = AppState::with_store(config.clone(), store, None);
        let router = build_app(state.clone());
        let issuer = TokenIssuer::new(&config.auth);

        Self {
            router,
            state,
            config,
            issuer,
        }
    }

    /// Issue a valid bearer token for `subject`
    pub fn token(&self, subject: &str, role: Role) -> String {
        self.issuer
            .issue(subject, role)
            .expect("Failed to issue token")
            .0
    }

    /// Issue a token that expired an hour ago
    pub fn expired_token(&self, subject: &str, role: Role) -> String {
        let issued_at = chrono::Utc::now() - chrono::Duration::hours(2);
        self.issuer
            .issue_at(subject, role, issued_at, chrono::Duration::hours(1))
            .expect("Failed to issue token")
            .0
    }

    /// Fetch a CSRF cookie secret and a matching request value
    pub async fn csrf_pair(&self) -> CsrfPair {
        let response = self.request("GET", "/api/csrf-token", None, None).await;
        assert_eq!(response.status, StatusCode::OK);

        let cookie = response
            .cookie(&self.config.csrf.cookie_name)
            .expect("csrf-token response should set the cookie");
        let token = response.body["csrf_token"]
            .as_str()
            .expect("csrf_token should be a string")
            .to_string();

        CsrfPair { cookie, token }
    }

    /// Send a JSON request with an optional bearer token
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = json_request(method, path, body);
        if let Some(token) = token {
            req.headers_mut().insert(
                "Authorization",
                format!("Bearer {token}").parse().expect("valid header"),
            );
        }
        self.send(req).await
    }

    /// Send a state-changing request carrying a bearer token and a CSRF pair
    pub async fn mutate(
        &self,
        path: &str,
        body: Option<Value>,
        token: &str,
        csrf: &CsrfPair,
    ) -> TestResponse {
        let mut req = json_request("POST", path, body);
        let headers = req.headers_mut();
        headers.insert(
            "Authorization",
            format!("Bearer {token}").parse().expect("valid header"),
        );
        headers.insert(
            "Cookie",
            format!("{}={}", self.config.csrf.cookie_name, csrf.cookie)
                .parse()
                .expect("valid header"),
        );
        headers.insert("X-CSRF-Token", csrf.token.parse().expect("valid header"));
        self.send(req).await
    }

    /// Send a prepared request through the router
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }

    /// Wait for the detached presence write for `key` to land
    pub async fn wait_for_visitor(&self, key: &VisitorKey, visits: i64) -> VisitorRecord {
        for _ in 0..100 {
            if let Some(record) = self.state.presence.lookup(key).await.expect("lookup") {
                if record.visit_count >= visits {
                    return record;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("visitor {key:?} never reached {visits} visits");
    }
}

fn json_request(method: &str, path: &str, body: Option<Value>) -> Request<Body> {
    let body_str = body
        .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
        .unwrap_or_default();

    Request::builder()
        .method(method)
        .uri(path)
        .header("Content-Type", "application/json")
        .body(Body::from(body_str))
        .expect("Failed to build request")
}

/// A CSRF cookie secret and the request value minted for it
#[derive(Debug, Clone)]
pub struct CsrfPair {
    pub cookie: String,
    pub token: String,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` for non-JSON responses
    pub body: Value,
    /// Raw body text
    pub text: String,
}

impl TestResponse {
    /// Value of the cookie `name` set by this response
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all("set-cookie")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .filter_map(|pair| pair.split_once('='))
            .find(|(n, _)| n.trim() == name)
            .map(|(_, value)| value.trim().to_string())
    }

    /// Stable error code from an error body
    pub fn error_code(&self) -> Option<&str> {
        self.body.get("code").and_then(Value::as_str)
    }
}
