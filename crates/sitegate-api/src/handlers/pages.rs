//! Placeholder for the public content pages.

use axum::http::Uri;
use axum::response::{Html, IntoResponse, Response};

use sitegate_core::error::AppError;

use crate::error::ApiError;

/// Fallback for every path without a dedicated route.
///
/// Unknown `/api` paths get a JSON 404; everything else is treated as a
/// content page so visitor tracking has something to observe.
pub async fn placeholder(uri: Uri) -> Response {
    let path = uri.path();
    if path == "/api" || path.starts_with("/api/") {
        return ApiError(AppError::not_found(format!("No route for {path}"))).into_response();
    }

    Html(format!(
        "<!doctype html><html><head><title>SiteGate</title></head>\
         <body><main data-path=\"{}\"></main></body></html>",
        escape(path)
    ))
    .into_response()
}

fn escape(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '&' => "&amp;".to_string(),
            other => other.to_string(),
        })
        .collect()
}
