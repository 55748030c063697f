use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

/// What the relay observed from viewers.
#[derive(Debug, Clone)]
pub enum RelayEvent {
    Connected(usize),
    Frame(usize, Value),
    Disconnected(usize),
}

struct RelayState {
    peers: Mutex<HashMap<usize, mpsc::UnboundedSender<Message>>>,
    next_id: AtomicUsize,
    events: mpsc::UnboundedSender<RelayEvent>,
}

/// In-process stand-in for the signaling relay.
pub struct MockRelay {
    pub url: String,
    state: Arc<RelayState>,
    events: mpsc::UnboundedReceiver<RelayEvent>,
    server: tokio::task::JoinHandle<()>,
}

impl MockRelay {
    pub async fn start() -> Result<Self> {
        let (events_tx, events) = mpsc::unbounded_channel();
        let state = Arc::new(RelayState {
            peers: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(1),
            events: events_tx,
        });

        let app = Router::new()
            .route("/", get(ws_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind mock relay")?;
        let addr = listener.local_addr()?;

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            url: format!("ws://{}", addr),
            state,
            events,
            server,
        })
    }

    /// Next raw relay event, or `None` on timeout.
    pub async fn next_event(&mut self, timeout_ms: u64) -> Option<RelayEvent> {
        tokio::time::timeout(Duration::from_millis(timeout_ms), self.events.recv())
            .await
            .ok()
            .flatten()
    }

    /// Waits for the next frame whose `type` is `kind`, skipping others.
    pub async fn expect_frame(&mut self, kind: &str, timeout_ms: u64) -> Result<Value> {
        let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);

        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            let event = tokio::time::timeout(remaining, self.events.recv())
                .await
                .with_context(|| format!("Timeout waiting for '{}' frame", kind))?
                .context("Relay event channel closed")?;

            if let RelayEvent::Frame(_, frame) = event {
                if frame["type"] == kind {
                    return Ok(frame);
                }
            }
        }
    }

    /// Collects every frame received within `window_ms`.
    pub async fn drain_frames(&mut self, window_ms: u64) -> Vec<Value> {
        let deadline = tokio::time::Instant::now() + Duration::from_millis(window_ms);
        let mut frames = Vec::new();

        while let Ok(Some(event)) =
            tokio::time::timeout_at(deadline, self.events.recv()).await
        {
            if let RelayEvent::Frame(_, frame) = event {
                frames.push(frame);
            }
        }
        frames
    }

    /// Sends `frame` to every connected viewer.
    pub async fn broadcast(&self, frame: Value) {
        let text = frame.to_string();
        for tx in self.state.peers.lock().await.values() {
            let _ = tx.send(Message::Text(text.clone().into()));
        }
    }

    /// Closes every viewer socket from the relay side.
    pub async fn kick_all(&self) {
        let mut peers = self.state.peers.lock().await;
        for (_, tx) in peers.drain() {
            let _ = tx.send(Message::Close(None));
        }
    }

    pub async fn connection_count(&self) -> usize {
        self.state.peers.lock().await.len()
    }
}

impl Drop for MockRelay {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<RelayState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<RelayState>) {
    let id = state.next_id.fetch_add(1, Ordering::SeqCst);
    tracing::debug!("[MockRelay] viewer {} connected", id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    state.peers.lock().await.insert(id, tx);
    let _ = state.events.send(RelayEvent::Connected(id));

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sender.send(msg).await.is_err() || closing {
                break;
            }
        }
    });

    let events = state.events.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<Value>(text.as_str()) {
                    Ok(frame) => {
                        tracing::debug!("[MockRelay] viewer {} sent {}", id, frame["type"]);
                        let _ = events.send(RelayEvent::Frame(id, frame));
                    }
                    Err(e) => tracing::warn!("[MockRelay] invalid frame from {}: {}", id, e),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.peers.lock().await.remove(&id);
    let _ = state.events.send(RelayEvent::Disconnected(id));
    tracing::debug!("[MockRelay] viewer {} disconnected", id);
}
