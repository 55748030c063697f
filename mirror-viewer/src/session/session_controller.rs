use crate::config::{LaunchContext, ViewerConfig};
use crate::error::ViewerError;
use crate::negotiation::{NegotiationEngine, PeerEvent};
use crate::session::{SessionCommand, StatusModel};
use crate::signaling::{SignalingClient, SignalingEvent, decode};
use crate::sink::{RenderSink, StatusSink};
use mirror_core::{RoomId, SignalMessage, StatusUpdate};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Wires the relay connection to the negotiation engine for one room.
///
/// All state lives in this struct and is only touched from [`run`], which
/// reacts to relay events, peer events, the reconnect timer and commands.
///
/// [`run`]: SessionController::run
pub struct SessionController {
    room_id: RoomId,
    status: StatusModel,
    signaling: SignalingClient,
    engine: NegotiationEngine,
    signal_rx: mpsc::Receiver<SignalingEvent>,
    peer_rx: mpsc::Receiver<PeerEvent>,
    command_rx: mpsc::Receiver<SessionCommand>,
}

impl SessionController {
    pub fn new(
        config: ViewerConfig,
        status: Arc<dyn StatusSink>,
        render: Arc<dyn RenderSink>,
        command_rx: mpsc::Receiver<SessionCommand>,
    ) -> Self {
        let (signal_tx, signal_rx) = mpsc::channel(256);
        let (peer_tx, peer_rx) = mpsc::channel(256);

        let signaling = SignalingClient::new(
            config.relay_url,
            config.room_id.clone(),
            config.reconnect_delay,
            signal_tx,
        );
        let engine = NegotiationEngine::new(config.ice_servers, render, peer_tx);

        Self {
            room_id: config.room_id,
            status: StatusModel::new(status),
            signaling,
            engine,
            signal_rx,
            peer_rx,
            command_rx,
        }
    }

    /// Resolves the launch context into a config. A missing room id is
    /// reported to `status` once and returned as an error; the caller must
    /// not connect.
    pub fn configure(
        launch: &LaunchContext,
        status: &Arc<dyn StatusSink>,
    ) -> Result<ViewerConfig, ViewerError> {
        ViewerConfig::from_launch(launch).inspect_err(|e| {
            error!("Cannot start viewer: {}", e);
            StatusModel::new(status.clone()).apply(StatusUpdate::missing_room());
        })
    }

    /// Spawns the controller and returns a handle to stop it.
    pub fn start(
        config: ViewerConfig,
        status: Arc<dyn StatusSink>,
        render: Arc<dyn RenderSink>,
    ) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::channel(8);
        let controller = Self::new(config, status, render, command_rx);
        let task = tokio::spawn(controller.run());

        SessionHandle { command_tx, task }
    }

    pub async fn run(mut self) {
        info!(
            "Session controller started for room {} via {}",
            self.room_id,
            self.signaling.relay_url()
        );
        self.connect();

        // Commands first so a shutdown is never starved by relay traffic.
        loop {
            tokio::select! {
                biased;
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(SessionCommand::Shutdown) => {
                            info!("Shutdown requested");
                            break;
                        }
                        None => {
                            info!("Command channel closed. Shutting down session.");
                            break;
                        }
                    }
                }

                Some(evt) = self.signal_rx.recv() => self.handle_signaling_event(evt).await,

                Some(evt) = self.peer_rx.recv() => self.handle_peer_event(evt).await,

                _ = self.signaling.reconnect_due() => {
                    info!("Reconnect delay elapsed");
                    self.connect();
                }
            }
        }

        self.engine.teardown().await;
        self.signaling.close();
        info!("Session controller finished");
    }

    fn connect(&mut self) {
        self.status.apply(StatusUpdate::connecting());
        self.signaling.connect();
    }

    async fn handle_signaling_event(&mut self, event: SignalingEvent) {
        if !self.signaling.is_current(event.generation()) {
            debug!("Dropping event from replaced relay connection");
            return;
        }

        match event {
            SignalingEvent::Opened {
                generation,
                outbound,
            } => {
                if self.signaling.on_opened(generation, outbound) {
                    self.status.apply(StatusUpdate::waiting_for_presenter());
                }
            }

            SignalingEvent::Frame { text, .. } => {
                if let Some(msg) = decode(&text) {
                    self.handle_signal(msg).await;
                }
            }

            SignalingEvent::Error { reason, .. } => {
                warn!("Relay connection error: {}", reason);
                self.status.apply(StatusUpdate::channel_error());
            }

            SignalingEvent::Closed { generation } => {
                if self.signaling.on_closed(generation) {
                    self.status.apply(StatusUpdate::connection_lost());
                }
            }
        }
    }

    async fn handle_signal(&mut self, msg: SignalMessage) {
        debug!("Relay message: {}", msg.kind());

        match msg {
            SignalMessage::JoinedRoom => {
                info!("Joined room {}", self.room_id);
                self.status.apply(StatusUpdate::joined_room());
            }

            SignalMessage::Error { message } => {
                warn!("Relay reported error: {:?}", message);
                self.status
                    .apply(StatusUpdate::relay_error(message.as_deref()));
            }

            SignalMessage::Offer { sdp: Some(sdp) } => {
                info!("Received offer from presenter");
                let update = self.engine.handle_offer(sdp).await;
                self.status.apply(update);
            }

            // Still replaces the current session, like any other offer.
            SignalMessage::Offer { sdp: None } => {
                error!("Received offer without SDP");
                self.engine.teardown().await;
                self.status.apply(StatusUpdate::setup_failed());
            }

            SignalMessage::IceCandidate {
                candidate: Some(candidate),
                ..
            } => self.engine.handle_remote_candidate(candidate).await,

            SignalMessage::IceCandidate {
                candidate: None, ..
            } => debug!("Ignoring empty ICE candidate"),

            SignalMessage::PresenterLeft => {
                info!("Presenter left room {}", self.room_id);
                self.engine.teardown().await;
                self.status.apply(StatusUpdate::presenter_left());
            }

            other @ (SignalMessage::JoinRoom { .. }
            | SignalMessage::Answer { .. }
            | SignalMessage::Unknown) => {
                debug!("Ignoring {} message from relay", other.kind());
            }
        }
    }

    async fn handle_peer_event(&mut self, event: PeerEvent) {
        if let Some(update) = self.engine.handle_event(event, &self.signaling).await {
            self.status.apply(update);
        }
    }
}

/// Handle to a spawned [`SessionController`].
pub struct SessionHandle {
    command_tx: mpsc::Sender<SessionCommand>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Stops the session and waits for it to release its connections.
    pub async fn shutdown(self) {
        if self.command_tx.send(SessionCommand::Shutdown).await.is_err() {
            debug!("Session already stopped");
        }
        if let Err(e) = self.task.await {
            error!("Session task ended abnormally: {}", e);
        }
    }
}
