//! Integration tests for double-submit CSRF protection.

mod helpers;

use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::json;
use sitegate_entity::user::Role;

fn announcement() -> serde_json::Value {
    json!({
        "title": "Maintenance",
        "message": "The site restarts at 02:00 UTC",
        "severity": "warning",
    })
}

#[tokio::test]
async fn test_csrf_token_sets_http_only_cookie() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/api/csrf-token", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    let set_cookie = response
        .headers
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(set_cookie.starts_with("_csrf="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(response.body["csrf_token"].as_str().unwrap().contains('.'));
}

#[tokio::test]
async fn test_existing_cookie_is_reused() {
    let app = helpers::TestApp::new();
    let pair = app.csrf_pair().await;

    let req = Request::builder()
        .method("GET")
        .uri("/api/csrf-token")
        .header("Cookie", format!("_csrf={}", pair.cookie))
        .body(Body::empty())
        .unwrap();
    let response = app.send(req).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.cookie("_csrf").is_none());
    let second = response.body["csrf_token"].as_str().unwrap();
    assert_ne!(second, pair.token);

    // A fresh value for the same cookie is accepted too.
    let token = app.token("admin-1", Role::Admin);
    let reissued = helpers::CsrfPair {
        cookie: pair.cookie.clone(),
        token: second.to_string(),
    };
    let response = app
        .mutate("/api/admin/live/broadcast", Some(announcement()), &token, &reissued)
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_mutation_without_csrf_is_forbidden() {
    let app = helpers::TestApp::new();
    let token = app.token("admin-1", Role::Admin);

    let response = app
        .request(
            "POST",
            "/api/admin/live/broadcast",
            Some(announcement()),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "CSRF");
    assert_eq!(response.error_code(), Some("EBADCSRFTOKEN"));
}

#[tokio::test]
async fn test_mutation_with_valid_pair_succeeds() {
    let app = helpers::TestApp::new();
    let token = app.token("admin-1", Role::Admin);
    let pair = app.csrf_pair().await;

    let response = app
        .mutate("/api/admin/live/broadcast", Some(announcement()), &token, &pair)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["delivered"], 0);
}

#[tokio::test]
async fn test_value_from_another_cookie_is_rejected() {
    let app = helpers::TestApp::new();
    let token = app.token("admin-1", Role::Admin);
    let mine = app.csrf_pair().await;
    let theirs = app.csrf_pair().await;

    let crossed = helpers::CsrfPair {
        cookie: mine.cookie,
        token: theirs.token,
    };
    let response = app
        .mutate("/api/admin/live/broadcast", Some(announcement()), &token, &crossed)
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), Some("EBADCSRFTOKEN"));
}

#[tokio::test]
async fn test_query_parameter_is_accepted() {
    let app = helpers::TestApp::new();
    let token = app.token("admin-1", Role::Admin);
    let pair = app.csrf_pair().await;

    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/admin/live/broadcast?_csrf={}", pair.token))
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {token}"))
        .header("Cookie", format!("_csrf={}", pair.cookie))
        .body(Body::from(announcement().to_string()))
        .unwrap();
    let response = app.send(req).await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_authentication_runs_before_csrf() {
    let app = helpers::TestApp::new();

    let response = app
        .request("POST", "/api/admin/live/broadcast", Some(announcement()), None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), Some("CREDENTIAL_MISSING"));
}

#[tokio::test]
async fn test_role_check_runs_before_csrf() {
    let app = helpers::TestApp::new();
    let token = app.token("editor-1", Role::Staff);
    let pair = app.csrf_pair().await;

    let response = app
        .mutate("/api/admin/live/broadcast", Some(announcement()), &token, &pair)
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), Some("ROLE_FORBIDDEN"));
}

#[tokio::test]
async fn test_reads_bypass_csrf() {
    let app = helpers::TestApp::new();
    let token = app.token("admin-1", Role::Admin);

    let response = app
        .request("GET", "/api/admin/live", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["count"], 0);
}

#[tokio::test]
async fn test_invalid_broadcast_body_is_rejected_after_csrf() {
    let app = helpers::TestApp::new();
    let token = app.token("admin-1", Role::Admin);
    let pair = app.csrf_pair().await;

    let response = app
        .mutate(
            "/api/admin/live/broadcast",
            Some(json!({ "title": "", "message": "x", "severity": "loud" })),
            &token,
            &pair,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_disconnect_unknown_connection_is_not_found() {
    let app = helpers::TestApp::new();
    let token = app.token("admin-1", Role::Admin);
    let pair = app.csrf_pair().await;

    let response = app
        .mutate(
            "/api/admin/live/00000000-0000-0000-0000-000000000000/disconnect",
            None,
            &token,
            &pair,
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
