//! Live WebSocket endpoint.

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use sitegate_realtime::{
    CloseReason, HubEvent, InboundMessage, Keepalive, OutboundMessage, RealtimeError,
};

use crate::extractors::PeerAddr;
use crate::state::AppState;

/// WebSocket close code for "try again later".
const CLOSE_TRY_AGAIN_LATER: u16 = 1013;

type WsSink = SplitSink<WebSocket, Message>;

/// GET /ws (WebSocket upgrade)
pub async fn ws_handler(
    State(state): State<AppState>,
    PeerAddr(peer): PeerAddr,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_ws_connection(state, peer.map(|p| p.to_string()), socket))
}

/// Handles an established WebSocket connection.
///
/// Joins the hub once the handshake is done, then multiplexes socket
/// reads, hub events and the keepalive timers until either side closes.
/// The keepalive state lives on this task and is dropped with it.
async fn handle_ws_connection(state: AppState, peer: Option<String>, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let mut conn = match state.hub.join(peer).await {
        Ok(conn) => conn,
        Err(e) => {
            reject(&mut ws_tx, e).await;
            return;
        }
    };
    let conn_id = conn.id();
    let metrics = state.hub.metrics().clone();
    info!(conn_id = %conn_id, peer = ?conn.info().peer, "Live connection established");

    let mut keepalive = Keepalive::from_config(state.hub.config());
    let mut ping_ticker = keepalive.ticker();

    let initial = OutboundMessage::from(conn.current_count());
    let reason = if send_json(&mut ws_tx, &initial).await.is_err() {
        CloseReason::ClientClosed
    } else {
        loop {
            tokio::select! {
                frame = ws_rx.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        keepalive.touch();
                        metrics.message_received();
                        let reply = match serde_json::from_str::<InboundMessage>(text.as_str()) {
                            Ok(InboundMessage::Ping) => OutboundMessage::pong(),
                            Err(e) => OutboundMessage::Error {
                                code: "INVALID_MESSAGE".to_string(),
                                message: format!("Failed to parse message: {e}"),
                            },
                        };
                        if send_json(&mut ws_tx, &reply).await.is_err() {
                            break CloseReason::ClientClosed;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break CloseReason::ClientClosed,
                    Some(Ok(_)) => keepalive.touch(),
                    Some(Err(e)) => {
                        debug!(conn_id = %conn_id, error = %e, "WebSocket read error");
                        break CloseReason::ClientClosed;
                    }
                },
                event = conn.next_event() => match event {
                    HubEvent::Count(count) => {
                        if send_json(&mut ws_tx, &OutboundMessage::from(count)).await.is_err() {
                            break CloseReason::ClientClosed;
                        }
                    }
                    HubEvent::Message(message) => {
                        if send_json(&mut ws_tx, &message).await.is_err() {
                            break CloseReason::ClientClosed;
                        }
                    }
                    HubEvent::Closed(reason) => break reason,
                },
                _ = ping_ticker.tick() => {
                    if ws_tx.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break CloseReason::ClientClosed;
                    }
                }
                _ = tokio::time::sleep_until(keepalive.deadline()) => {
                    metrics.idle_timeout();
                    break CloseReason::IdleTimeout;
                }
            }
        }
    };

    conn.begin_close();
    if reason != CloseReason::ClientClosed {
        let frame = CloseFrame {
            code: reason.close_code(),
            reason: reason.as_str().into(),
        };
        let _ = ws_tx.send(Message::Close(Some(frame))).await;
    }
    conn.leave().await;

    info!(conn_id = %conn_id, reason = ?reason, "Live connection closed");
}

async fn send_json(ws_tx: &mut WsSink, message: &OutboundMessage) -> Result<(), axum::Error> {
    let text = match serde_json::to_string(message) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Failed to serialize outbound message");
            return Ok(());
        }
    };
    ws_tx.send(Message::Text(text.into())).await
}

async fn reject(ws_tx: &mut WsSink, err: RealtimeError) {
    warn!(error = %err, "Live connection refused");
    let message = OutboundMessage::Error {
        code: err.code().to_string(),
        message: err.to_string(),
    };
    let _ = send_json(ws_tx, &message).await;
    let frame = CloseFrame {
        code: CLOSE_TRY_AGAIN_LATER,
        reason: err.code().into(),
    };
    let _ = ws_tx.send(Message::Close(Some(frame))).await;
}
