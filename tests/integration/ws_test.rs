//! Integration tests for the live WebSocket channel, over a real socket.

mod helpers;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use sitegate_api::AppState;
use sitegate_core::error::AppError;
use sitegate_service::presence::MemoryVisitorStore;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

/// A server running on an ephemeral port
struct LiveServer {
    addr: SocketAddr,
    state: AppState,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<(), AppError>>,
}

impl LiveServer {
    async fn start() -> Self {
        Self::start_with(helpers::test_config()).await
    }

    async fn start_with(config: sitegate_core::config::AppConfig) -> Self {
        let state = AppState::with_store(config, Arc::new(MemoryVisitorStore::new()), None);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let task = tokio::spawn(sitegate_api::serve(listener, state.clone(), async move {
            let _ = rx.await;
        }));

        Self {
            addr,
            state,
            shutdown: Some(tx),
            task,
        }
    }

    async fn connect(&self) -> Client {
        let (ws, _) = connect_async(format!("ws://{}/ws", self.addr))
            .await
            .expect("WebSocket handshake failed");
        ws
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        tokio::time::timeout(WAIT, self.task)
            .await
            .expect("server did not stop")
            .unwrap()
            .unwrap();
    }
}

/// Reads frames until a JSON message of type `kind` matching `pred` arrives
async fn next_json(ws: &mut Client, kind: &str, pred: impl Fn(&Value) -> bool) -> Value {
    tokio::time::timeout(WAIT, async {
        while let Some(frame) = ws.next().await {
            if let Message::Text(text) = frame.expect("socket error") {
                let value: Value = serde_json::from_str(text.as_str()).unwrap();
                if value["type"] == kind && pred(&value) {
                    return value;
                }
            }
        }
        panic!("socket closed while waiting for {kind}");
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {kind}"))
}

async fn wait_for_count(ws: &mut Client, count: u64) {
    next_json(ws, "presence_count", |v| v["count"] == count).await;
}

#[tokio::test]
async fn test_upgrade_requires_websocket_handshake() {
    let app = helpers::TestApp::new();

    let response = app.request("GET", "/ws", None, None).await;

    assert!(
        response.status.is_client_error(),
        "Expected a 4xx for a plain GET, got {}",
        response.status
    );
}

#[tokio::test]
async fn test_clients_see_live_count() {
    let server = LiveServer::start().await;

    let mut a = server.connect().await;
    wait_for_count(&mut a, 1).await;
    let mut b = server.connect().await;
    let mut c = server.connect().await;

    wait_for_count(&mut a, 3).await;
    wait_for_count(&mut b, 3).await;
    wait_for_count(&mut c, 3).await;

    c.close(None).await.unwrap();

    wait_for_count(&mut a, 2).await;
    wait_for_count(&mut b, 2).await;

    drop(b);
    wait_for_count(&mut a, 1).await;

    server.stop().await;
}

#[tokio::test]
async fn test_ping_gets_pong() {
    let server = LiveServer::start().await;
    let mut ws = server.connect().await;

    ws.send(Message::Text(json!({ "type": "ping" }).to_string().into()))
        .await
        .unwrap();

    let pong = next_json(&mut ws, "pong", |_| true).await;
    assert!(pong["timestamp"].as_i64().unwrap() > 0);

    server.stop().await;
}

#[tokio::test]
async fn test_invalid_message_gets_error_and_keeps_connection() {
    let server = LiveServer::start().await;
    let mut ws = server.connect().await;

    ws.send(Message::Text("not json".into())).await.unwrap();
    let error = next_json(&mut ws, "error", |_| true).await;
    assert_eq!(error["code"], "INVALID_MESSAGE");

    ws.send(Message::Text(json!({ "type": "ping" }).to_string().into()))
        .await
        .unwrap();
    next_json(&mut ws, "pong", |_| true).await;

    server.stop().await;
}

#[tokio::test]
async fn test_broadcast_reaches_clients() {
    let server = LiveServer::start().await;
    let mut a = server.connect().await;
    let mut b = server.connect().await;
    wait_for_count(&mut a, 2).await;
    wait_for_count(&mut b, 2).await;

    let delivered = server
        .state
        .hub
        .announce(sitegate_realtime::OutboundMessage::announcement(
            "Maintenance",
            "Back in five",
            "info",
        ))
        .await;
    assert_eq!(delivered, 2);

    for ws in [&mut a, &mut b] {
        let msg = next_json(ws, "announcement", |_| true).await;
        assert_eq!(msg["title"], "Maintenance");
        assert_eq!(msg["severity"], "info");
    }

    server.stop().await;
}

#[tokio::test]
async fn test_hub_at_capacity_closes_with_try_again_later() {
    let mut config = helpers::test_config();
    config.realtime.max_connections = 1;
    let server = LiveServer::start_with(config).await;

    let mut first = server.connect().await;
    wait_for_count(&mut first, 1).await;

    let mut second = server.connect().await;
    let error = next_json(&mut second, "error", |_| true).await;
    assert_eq!(error["code"], "HUB_FULL");

    let close = tokio::time::timeout(WAIT, async {
        while let Some(Ok(frame)) = second.next().await {
            if let Message::Close(frame) = frame {
                return frame;
            }
        }
        None
    })
    .await
    .unwrap();
    assert_eq!(close.map(|f| f.code), Some(CloseCode::Again));
    assert_eq!(server.state.hub.count().count, 1);

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_closes_every_connection() {
    let server = LiveServer::start().await;
    let mut a = server.connect().await;
    let mut b = server.connect().await;
    wait_for_count(&mut a, 2).await;
    wait_for_count(&mut b, 2).await;

    let state = server.state.clone();
    server.stop().await;

    assert_eq!(state.hub.count().count, 0);
    assert!(state.hub.is_shutting_down());

    for ws in [&mut a, &mut b] {
        let code = tokio::time::timeout(WAIT, async {
            while let Some(Ok(frame)) = ws.next().await {
                if let Message::Close(frame) = frame {
                    return frame.map(|f| f.code);
                }
            }
            None
        })
        .await
        .unwrap();
        assert!(matches!(code, Some(CloseCode::Away) | None));
    }
}

#[tokio::test]
async fn test_silent_client_is_closed_after_keepalive_window() {
    let mut config = helpers::test_config();
    config.realtime.ping_interval_seconds = 1;
    config.realtime.ping_timeout_seconds = 1;
    let server = LiveServer::start_with(config).await;

    let mut active = server.connect().await;
    wait_for_count(&mut active, 1).await;
    // Never read from again, so server pings go unanswered.
    let silent = server.connect().await;
    wait_for_count(&mut active, 2).await;

    // The active client keeps talking; the silent one is dropped once
    // interval + timeout elapse without a frame from it.
    let mut heartbeat = tokio::time::interval(Duration::from_millis(300));
    tokio::time::timeout(Duration::from_secs(8), async {
        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    active
                        .send(Message::Text(json!({ "type": "ping" }).to_string().into()))
                        .await
                        .unwrap();
                }
                frame = active.next() => {
                    if let Message::Text(text) = frame.expect("socket closed").unwrap() {
                        let value: Value = serde_json::from_str(text.as_str()).unwrap();
                        if value["type"] == "presence_count" && value["count"] == 1 {
                            break;
                        }
                    }
                }
            }
        }
    })
    .await
    .expect("active client never saw the silent one leave");

    assert_eq!(server.state.hub.count().count, 1);
    assert_eq!(server.state.hub.metrics().snapshot().idle_timeouts, 1);

    drop(silent);
    server.stop().await;
}

#[tokio::test]
async fn test_remaining_clients_converge_after_partial_close() {
    let server = LiveServer::start().await;

    let mut clients = Vec::new();
    for _ in 0..6 {
        clients.push(server.connect().await);
    }
    for ws in clients.iter_mut() {
        wait_for_count(ws, 6).await;
    }

    for mut ws in clients.drain(..2) {
        ws.close(None).await.unwrap();
    }

    for ws in clients.iter_mut() {
        wait_for_count(ws, 4).await;
    }
    assert_eq!(server.state.hub.count().count, 4);

    server.stop().await;
}
