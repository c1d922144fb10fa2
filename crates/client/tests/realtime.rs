//! Realtime listener against a local WebSocket server.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use common::{bus, signed_in, MemoryBackend};
use futures::{SinkExt, StreamExt};
use learnspace_client::reconnect::ReconnectConfig;
use learnspace_client::{ClientConfig, RealtimeListener};
use learnspace_events::{ChangeEvent, ChangeTopic};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

const TIMEOUT: Duration = Duration::from_secs(5);

fn config(addr: SocketAddr) -> ClientConfig {
    ClientConfig {
        base_url: format!("http://{addr}"),
        reconnect: ReconnectConfig {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
            multiplier: 2.0,
        },
        ..Default::default()
    }
}

/// Serve realtime connections. The first `reject` handshakes answer 401;
/// later ones receive `event`. Every requested query string is reported.
async fn serve(reject: usize, event: ChangeEvent) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (seen_tx, seen_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut handshakes = 0;
        loop {
            let (socket, _) = listener.accept().await.unwrap();
            handshakes += 1;
            let rejected = handshakes <= reject;
            let seen_tx = seen_tx.clone();
            let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                let _ = seen_tx.send(req.uri().query().unwrap_or_default().to_string());
                if rejected {
                    let mut denied = ErrorResponse::new(Some("invalid token".into()));
                    *denied.status_mut() = StatusCode::UNAUTHORIZED;
                    return Err(denied);
                }
                Ok(resp)
            };
            let Ok(mut ws) = accept_hdr_async(socket, callback).await else {
                continue;
            };
            let event = event.clone();
            tokio::spawn(async move {
                ws.send(Message::Text("heartbeat".into())).await.unwrap();
                ws.send(Message::Text(serde_json::to_string(&event).unwrap()))
                    .await
                    .unwrap();
                while let Some(Ok(_)) = ws.next().await {}
            });
        }
    });

    (addr, seen_rx)
}

#[tokio::test]
async fn server_frames_reach_the_bus() {
    let backend = MemoryBackend::with_account();
    let user_id = signed_in(&backend).await;
    let event = ChangeEvent::created(ChangeTopic::Classrooms, user_id).with_entity(7);
    let (addr, mut seen) = serve(0, event).await;

    let bus = bus();
    let mut rx = bus.subscribe();
    let cancel = CancellationToken::new();
    let handle = RealtimeListener::new(backend.clone(), config(addr), bus.clone())
        .spawn(cancel.clone());

    let relayed = tokio::time::timeout(TIMEOUT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(relayed.topic, ChangeTopic::Classrooms);
    assert_eq!(relayed.entity_id, Some(7));
    assert_eq!(relayed.user_id, user_id);

    let query = seen.recv().await.unwrap();
    assert_eq!(query, format!("token=token-{user_id}-0"));

    cancel.cancel();
    tokio::time::timeout(TIMEOUT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn rejected_token_is_refreshed_before_reconnecting() {
    let backend = MemoryBackend::with_account();
    let user_id = signed_in(&backend).await;
    let event = ChangeEvent::updated(ChangeTopic::Modules, user_id).with_parent(3);
    let (addr, mut seen) = serve(1, event).await;

    let bus = bus();
    let mut rx = bus.subscribe();
    let cancel = CancellationToken::new();
    let handle = RealtimeListener::new(backend.clone(), config(addr), bus.clone())
        .spawn(cancel.clone());

    let relayed = tokio::time::timeout(TIMEOUT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(relayed.parent_id, Some(3));

    let first = seen.recv().await.unwrap();
    let second = seen.recv().await.unwrap();
    assert_ne!(first, second, "reconnect must use the refreshed token");
    assert!(backend.calls("current_identity") >= 1);

    cancel.cancel();
    tokio::time::timeout(TIMEOUT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn listener_waits_for_sign_in() {
    let backend = MemoryBackend::with_account();
    let event = ChangeEvent::created(ChangeTopic::PromptSessions, 1);
    let (addr, mut seen) = serve(0, event).await;

    let bus = bus();
    let mut rx = bus.subscribe();
    let cancel = CancellationToken::new();
    let handle = RealtimeListener::new(backend.clone(), config(addr), bus.clone())
        .spawn(cancel.clone());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(seen.try_recv().is_err(), "no connect without a token");

    signed_in(&backend).await;
    let relayed = tokio::time::timeout(TIMEOUT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(relayed.topic, ChangeTopic::PromptSessions);

    cancel.cancel();
    tokio::time::timeout(TIMEOUT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn cancelled_listener_returns() {
    let backend = MemoryBackend::with_account();
    signed_in(&backend).await;
    let config = ClientConfig {
        base_url: "http://127.0.0.1:9".into(),
        ..Default::default()
    };
    let listener = RealtimeListener::new(backend, config, bus());

    let cancel = CancellationToken::new();
    cancel.cancel();
    tokio::time::timeout(TIMEOUT, listener.run(cancel))
        .await
        .expect("listener should stop when cancelled");
}
