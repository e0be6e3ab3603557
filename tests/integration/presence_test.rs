//! Integration tests for visitor tracking on page requests.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use chrono::{DateTime, Utc};
use http::{Request, StatusCode};

use sitegate_core::error::AppError;
use sitegate_core::result::AppResult;
use sitegate_entity::user::Role;
use sitegate_entity::visitor::{VisitorKey, VisitorRecord};
use sitegate_service::presence::sighting::{UNKNOWN_ORIGIN, client_signature};
use sitegate_service::presence::{MemoryVisitorStore, VisitorStore};

fn page_request(path: &str, origin: &str, user_agent: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .header("X-Forwarded-For", origin)
        .header("User-Agent", user_agent)
        .body(Body::empty())
        .unwrap()
}

fn key_for(origin: &str, user_agent: &str) -> VisitorKey {
    VisitorKey::new(origin, client_signature(None, Some(user_agent)))
}

#[derive(Debug)]
struct UnavailableStore;

#[async_trait]
impl VisitorStore for UnavailableStore {
    async fn upsert(&self, _: &VisitorKey, _: DateTime<Utc>) -> AppResult<VisitorRecord> {
        Err(AppError::database("visitor store unavailable"))
    }

    async fn find(&self, _: &VisitorKey) -> AppResult<Option<VisitorRecord>> {
        Err(AppError::database("visitor store unavailable"))
    }

    async fn list_recent(&self, _: usize) -> AppResult<Vec<VisitorRecord>> {
        Err(AppError::database("visitor store unavailable"))
    }

    async fn count(&self) -> AppResult<u64> {
        Err(AppError::database("visitor store unavailable"))
    }
}

#[derive(Debug)]
struct HangingStore;

#[async_trait]
impl VisitorStore for HangingStore {
    async fn upsert(&self, _: &VisitorKey, _: DateTime<Utc>) -> AppResult<VisitorRecord> {
        std::future::pending().await
    }

    async fn find(&self, _: &VisitorKey) -> AppResult<Option<VisitorRecord>> {
        Ok(None)
    }

    async fn list_recent(&self, _: usize) -> AppResult<Vec<VisitorRecord>> {
        Ok(Vec::new())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(0)
    }
}

#[tokio::test]
async fn test_page_visit_is_recorded() {
    let app = helpers::TestApp::new();

    let response = app.send(page_request("/", "1.2.3.4", "ua-A")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains("<html"));

    let record = app.wait_for_visitor(&key_for("1.2.3.4", "ua-A"), 1).await;
    assert_eq!(record.visit_count, 1);
    assert_eq!(record.first_seen, record.last_seen);
}

#[tokio::test]
async fn test_repeat_visit_increments_count() {
    let app = helpers::TestApp::new();
    let key = key_for("1.2.3.4", "ua-A");

    app.send(page_request("/", "1.2.3.4", "ua-A")).await;
    let first = app.wait_for_visitor(&key, 1).await;

    app.send(page_request("/articles/rust", "1.2.3.4", "ua-A"))
        .await;
    let second = app.wait_for_visitor(&key, 2).await;

    assert_eq!(second.visit_count, 2);
    assert_eq!(second.first_seen, first.first_seen);
    assert!(second.last_seen >= first.last_seen);
}

#[tokio::test]
async fn test_distinct_user_agents_are_distinct_visitors() {
    let app = helpers::TestApp::new();

    app.send(page_request("/", "1.2.3.4", "ua-A")).await;
    app.send(page_request("/", "1.2.3.4", "ua-B")).await;

    app.wait_for_visitor(&key_for("1.2.3.4", "ua-A"), 1).await;
    app.wait_for_visitor(&key_for("1.2.3.4", "ua-B"), 1).await;
    assert_eq!(app.state.presence.total().await.unwrap(), 2);
}

#[tokio::test]
async fn test_first_forwarded_address_is_the_origin() {
    let app = helpers::TestApp::new();

    app.send(page_request("/", "9.9.9.9, 10.0.0.1", "ua-A"))
        .await;

    app.wait_for_visitor(&key_for("9.9.9.9", "ua-A"), 1).await;
}

#[tokio::test]
async fn test_api_and_asset_requests_are_not_tracked() {
    let app = helpers::TestApp::new();

    app.send(page_request("/api/health", "5.5.5.5", "ua-A"))
        .await;
    app.send(page_request("/static/app.js", "5.5.5.5", "ua-A"))
        .await;
    app.send(page_request("/logo.png", "5.5.5.5", "ua-A")).await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(app.state.presence.total().await.unwrap(), 0);
}

#[tokio::test]
async fn test_non_get_requests_are_not_tracked() {
    let app = helpers::TestApp::new();

    let req = Request::builder()
        .method("POST")
        .uri("/contact")
        .header("X-Forwarded-For", "5.5.5.5")
        .header("User-Agent", "ua-A")
        .body(Body::empty())
        .unwrap();
    app.send(req).await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(app.state.presence.total().await.unwrap(), 0);
}

#[tokio::test]
async fn test_store_failure_does_not_fail_the_page() {
    let app = helpers::TestApp::with_store(Arc::new(UnavailableStore));

    let response = app.send(page_request("/", "1.2.3.4", "ua-A")).await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_hanging_store_does_not_delay_the_page() {
    let app = helpers::TestApp::with_store(Arc::new(HangingStore));

    let response = tokio::time::timeout(
        Duration::from_secs(1),
        app.send(page_request("/", "1.2.3.4", "ua-A")),
    )
    .await
    .expect("page response should not wait for the visitor store");

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_lists_recent_visitors() {
    let app = helpers::TestApp::new();
    let token = app.token("editor-1", Role::Staff);

    app.send(page_request("/", "1.2.3.4", "ua-A")).await;
    app.wait_for_visitor(&key_for("1.2.3.4", "ua-A"), 1).await;

    let response = app
        .request("GET", "/api/admin/visitors?limit=10", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["total"], 1);
    assert_eq!(response.body["data"]["items"][0]["origin_id"], "1.2.3.4");
    assert_eq!(response.body["data"]["items"][0]["visit_count"], 1);
}

#[tokio::test]
async fn test_unknown_api_path_is_json_not_found() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/nope", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_forwarded_for_ignored_when_untrusted() {
    let mut config = helpers::test_config();
    config.presence.trust_forwarded_for = false;
    let app = helpers::TestApp::with_config(config, Arc::new(MemoryVisitorStore::new()));

    app.send(page_request("/", "6.6.6.6", "ua-A")).await;

    // No socket peer under oneshot, so the origin falls back to "unknown".
    app.wait_for_visitor(&key_for(UNKNOWN_ORIGIN, "ua-A"), 1)
        .await;
    assert!(
        app.state
            .presence
            .lookup(&key_for("6.6.6.6", "ua-A"))
            .await
            .unwrap()
            .is_none()
    );
}
