//! Integration tests for bearer authentication and role checks.

mod helpers;

use http::StatusCode;
use sitegate_auth::TokenIssuer;
use sitegate_core::config::AuthConfig;
use sitegate_entity::user::Role;

#[tokio::test]
async fn test_health_is_public() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");
    assert_eq!(response.error_code(), Some("CREDENTIAL_MISSING"));
}

#[tokio::test]
async fn test_expired_token_is_distinguished() {
    let app = helpers::TestApp::new();
    let token = app.expired_token("editor-1", Role::Staff);

    let response = app.request("GET", "/api/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some("CREDENTIAL_EXPIRED"));
}

#[tokio::test]
async fn test_foreign_signature_is_invalid() {
    let app = helpers::TestApp::new();
    let foreign = TokenIssuer::new(&AuthConfig {
        jwt_secret: "some-other-secret".to_string(),
        ..AuthConfig::default()
    });
    let (token, _) = foreign.issue("admin-1", Role::Admin).unwrap();

    let response = app.request("GET", "/api/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some("CREDENTIAL_INVALID"));
}

#[tokio::test]
async fn test_garbage_token_is_invalid() {
    let app = helpers::TestApp::new();

    let response = app
        .request("GET", "/api/me", None, Some("not-a-token"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some("CREDENTIAL_INVALID"));
}

#[tokio::test]
async fn test_me_returns_identity() {
    let app = helpers::TestApp::new();
    let token = app.token("guest-42", Role::Guest);

    let response = app.request("GET", "/api/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["subject"], "guest-42");
    assert_eq!(response.body["data"]["role"], "guest");
    let ttl = response.body["data"]["expires_in_seconds"].as_u64().unwrap();
    assert!(ttl > 0 && ttl <= 30 * 60);
    let issued_at: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(response.body["data"]["issued_at"].clone()).unwrap();
    let expires_at: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(response.body["data"]["expires_at"].clone()).unwrap();
    assert_eq!(expires_at - issued_at, chrono::Duration::minutes(30));
}

#[tokio::test]
async fn test_guest_cannot_read_admin_routes() {
    let app = helpers::TestApp::new();
    let token = app.token("guest-42", Role::Guest);

    for path in ["/api/admin/visitors", "/api/admin/live", "/api/health/detailed"] {
        let response = app.request("GET", path, None, Some(&token)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{path}");
        assert_eq!(response.error_code(), Some("ROLE_FORBIDDEN"), "{path}");
    }
}

#[tokio::test]
async fn test_staff_reads_visitors_but_not_detailed_health() {
    let app = helpers::TestApp::new();
    let token = app.token("editor-1", Role::Staff);

    let visitors = app
        .request("GET", "/api/admin/visitors", None, Some(&token))
        .await;
    assert_eq!(visitors.status, StatusCode::OK);
    assert_eq!(visitors.body["data"]["total"], 0);

    let detailed = app
        .request("GET", "/api/health/detailed", None, Some(&token))
        .await;
    assert_eq!(detailed.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_reads_detailed_health() {
    let app = helpers::TestApp::new();
    let token = app.token("admin-1", Role::Admin);

    let response = app
        .request("GET", "/api/health/detailed", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["database"], "not_configured");
    assert_eq!(response.body["data"]["live_connections"], 0);
}

#[tokio::test]
async fn test_visitor_limit_is_validated() {
    let app = helpers::TestApp::new();
    let token = app.token("admin-1", Role::Admin);

    let response = app
        .request("GET", "/api/admin/visitors?limit=0", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}
