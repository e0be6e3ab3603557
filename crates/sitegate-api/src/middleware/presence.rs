//! Visitor tracking side-channel for page requests.

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;

use sitegate_service::presence::sighting::visitor_key;

use crate::extractors::PeerAddr;
use crate::state::AppState;

/// Records a sighting for page views, then runs the request.
///
/// The store write runs on a detached task; this middleware never waits
/// for it and never fails because of it.
pub async fn track_visitors(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::GET && state.presence.should_track(request.uri().path()) {
        let headers = request.headers();
        let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        let PeerAddr(peer) = PeerAddr::from_extensions(request.extensions());

        let forwarded_for = header_str("x-forwarded-for")
            .filter(|_| state.config.presence.trust_forwarded_for);

        let key = visitor_key(
            forwarded_for,
            peer.map(|addr| addr.ip()),
            header_str(&state.config.presence.signature_header),
            header_str("user-agent"),
        );
        drop(state.presence.record(key));
    }

    next.run(request).await
}
