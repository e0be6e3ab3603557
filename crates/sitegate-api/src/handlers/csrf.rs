//! CSRF token issuing.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::dto::response::CsrfTokenResponse;
use crate::state::AppState;

/// GET /api/csrf-token
///
/// Reuses the caller's cookie secret when it already has one, otherwise
/// sets a new `HttpOnly` cookie. Either way a fresh request value is
/// returned for the page to echo on unsafe requests.
pub async fn issue_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<CsrfTokenResponse>) {
    let config = state.csrf.config();

    let existing = jar
        .get(&config.cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());
    if let Some(existing) = existing {
        let csrf_token = state.csrf.issue_for(&existing);
        return (jar, Json(CsrfTokenResponse { csrf_token }));
    }

    let pair = state.csrf.issue();
    let cookie = Cookie::build((config.cookie_name.clone(), pair.cookie_value))
        .path(config.cookie_path.clone())
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .build();

    (
        jar.add(cookie),
        Json(CsrfTokenResponse {
            csrf_token: pair.request_value,
        }),
    )
}
