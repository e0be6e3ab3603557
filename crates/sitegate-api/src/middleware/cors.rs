//! CORS layer configuration.

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use sitegate_core::config::CorsConfig;

use crate::pipeline::CSRF_HEADERS;

/// Builds a CORS tower layer from configuration.
///
/// Explicit origins get credentialed requests (the CSRF cookie must travel);
/// the `*` wildcard does not.
pub fn build_cors_layer(config: &CorsConfig, signature_header: &str) -> CorsLayer {
    let mut headers = vec![header::AUTHORIZATION, header::CONTENT_TYPE];
    headers.extend(CSRF_HEADERS.into_iter().map(HeaderName::from_static));
    if let Ok(name) = HeaderName::try_from(signature_header) {
        headers.push(name);
    }

    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods(methods)
        .allow_headers(headers)
        .max_age(Duration::from_secs(config.max_age_seconds));

    if config.allowed_origins.iter().any(|o| o == "*") {
        layer.allow_origin(AllowOrigin::any())
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(origins).allow_credentials(true)
    }
}
