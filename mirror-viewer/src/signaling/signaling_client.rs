use crate::error::ViewerError;
use crate::signaling::{ReconnectTimer, SignalingEvent, SignalingOutput};
use futures::{SinkExt, StreamExt};
use mirror_core::{IceCandidatePayload, RoomId, SignalMessage};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

/// Owns the one logical connection to the relay.
///
/// Each call to [`SignalingClient::connect`] replaces the previous socket
/// with a fresh one under a new generation number; events from older
/// generations are ignored by the owner.
pub struct SignalingClient {
    relay_url: String,
    room_id: RoomId,
    generation: u64,
    outbound: Option<mpsc::UnboundedSender<String>>,
    connection: Option<JoinHandle<()>>,
    event_tx: mpsc::Sender<SignalingEvent>,
    reconnect: ReconnectTimer,
}

impl SignalingClient {
    pub fn new(
        relay_url: impl Into<String>,
        room_id: RoomId,
        reconnect_delay: Duration,
        event_tx: mpsc::Sender<SignalingEvent>,
    ) -> Self {
        Self {
            relay_url: relay_url.into(),
            room_id,
            generation: 0,
            outbound: None,
            connection: None,
            event_tx,
            reconnect: ReconnectTimer::new(reconnect_delay),
        }
    }

    pub fn relay_url(&self) -> &str {
        &self.relay_url
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub fn is_open(&self) -> bool {
        self.outbound
            .as_ref()
            .is_some_and(|outbound| !outbound.is_closed())
    }

    /// Starts a new connection attempt, discarding the previous one.
    pub fn connect(&mut self) {
        self.drop_connection();
        self.reconnect.cancel();
        self.generation += 1;

        info!(
            "Connecting to relay {} (attempt generation {})",
            self.relay_url, self.generation
        );

        let task = run_connection(
            self.relay_url.clone(),
            self.generation,
            self.event_tx.clone(),
        );
        self.connection = Some(tokio::spawn(task));
    }

    /// Marks the socket open and joins the room. Returns `false` for a stale
    /// generation.
    pub fn on_opened(&mut self, generation: u64, outbound: mpsc::UnboundedSender<String>) -> bool {
        if !self.is_current(generation) {
            debug!("Ignoring open from stale relay connection {}", generation);
            return false;
        }

        info!("Relay connection open, joining room {}", self.room_id);
        self.outbound = Some(outbound);
        self.send(&SignalMessage::join_room(self.room_id.clone()));
        true
    }

    /// Forgets the socket and arms the reconnect timer. Returns `false` for a
    /// stale generation.
    pub fn on_closed(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            debug!("Ignoring close from stale relay connection {}", generation);
            return false;
        }

        self.outbound = None;
        self.connection = None;
        if self.reconnect.schedule() {
            info!(
                "Relay connection closed, reconnecting in {:?}",
                self.reconnect.delay()
            );
        }
        true
    }

    /// Resolves when a scheduled reconnect is due.
    pub async fn reconnect_due(&mut self) {
        self.reconnect.fired().await
    }

    pub fn reconnect_pending(&self) -> bool {
        self.reconnect.is_pending()
    }

    /// Writes `msg` if the socket is open, otherwise drops it.
    pub fn send(&self, msg: &SignalMessage) {
        let Some(outbound) = &self.outbound else {
            debug!("Relay not open, dropping {} message", msg.kind());
            return;
        };

        match encode(msg) {
            Ok(json) => {
                if outbound.send(json).is_err() {
                    debug!("Relay writer gone, dropping {} message", msg.kind());
                }
            }
            Err(e) => error!("Failed to serialize signal message: {}", e),
        }
    }

    /// Closes the socket and cancels any pending reconnect.
    pub fn close(&mut self) {
        self.reconnect.cancel();
        self.drop_connection();
    }

    fn drop_connection(&mut self) {
        self.outbound = None;
        if let Some(connection) = self.connection.take() {
            connection.abort();
        }
    }
}

impl SignalingOutput for SignalingClient {
    fn send_answer(&self, sdp: String) {
        self.send(&SignalMessage::answer(self.room_id.clone(), sdp));
    }

    fn send_ice(&self, candidate: IceCandidatePayload) {
        self.send(&SignalMessage::local_candidate(self.room_id.clone(), candidate));
    }
}

impl Drop for SignalingClient {
    fn drop(&mut self) {
        self.drop_connection();
    }
}

pub fn encode(msg: &SignalMessage) -> Result<String, ViewerError> {
    Ok(serde_json::to_string(msg)?)
}

/// Decodes one relay frame. Invalid JSON or a missing `type` yields `None`.
pub fn decode(text: &str) -> Option<SignalMessage> {
    match serde_json::from_str::<SignalMessage>(text) {
        Ok(msg) => Some(msg),
        Err(e) => {
            warn!("Invalid signal message from relay: {:?}", e);
            None
        }
    }
}

async fn run_connection(url: String, generation: u64, event_tx: mpsc::Sender<SignalingEvent>) {
    let socket = match connect_async(url.as_str()).await {
        Ok((socket, _)) => socket,
        Err(e) => {
            warn!("Failed to connect to relay {}: {}", url, e);
            let _ = event_tx
                .send(SignalingEvent::Error {
                    generation,
                    reason: e.to_string(),
                })
                .await;
            let _ = event_tx.send(SignalingEvent::Closed { generation }).await;
            return;
        }
    };

    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();

    let opened = SignalingEvent::Opened {
        generation,
        outbound: outbound_tx,
    };
    if event_tx.send(opened).await.is_err() {
        return;
    }

    // Both halves live in this task so aborting it tears the socket down.
    let send_loop = async move {
        while let Some(text) = outbound_rx.recv().await {
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    };

    let recv_events = event_tx.clone();
    let recv_loop = async move {
        while let Some(msg) = receiver.next().await {
            let text = match msg {
                Ok(Message::Text(text)) => text.as_str().to_owned(),
                Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => text,
                    Err(_) => {
                        warn!("Dropping non UTF-8 binary frame from relay");
                        continue;
                    }
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => continue,
                Err(e) => {
                    let _ = recv_events
                        .send(SignalingEvent::Error {
                            generation,
                            reason: e.to_string(),
                        })
                        .await;
                    break;
                }
            };

            if recv_events
                .send(SignalingEvent::Frame { generation, text })
                .await
                .is_err()
            {
                break;
            }
        }
    };

    tokio::select! {
        _ = send_loop => {},
        _ = recv_loop => {},
    };

    info!("Relay connection {} closed", generation);
    let _ = event_tx.send(SignalingEvent::Closed { generation }).await;
}
