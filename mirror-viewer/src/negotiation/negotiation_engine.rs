use crate::negotiation::{PeerEvent, PeerSession, PeerSessionId};
use crate::signaling::SignalingOutput;
use crate::sink::RenderSink;
use mirror_core::{IceCandidatePayload, StatusUpdate};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;

/// Owns the current peer session and turns its events into status updates
/// and outbound signaling.
///
/// ```text
/// none --offer--> negotiating --track--> live <--> reconnecting
///                      |                  |
///                      +----failed<-------+      (until the next offer)
/// presenter-left / new offer: teardown -> none
/// ```
pub struct NegotiationEngine {
    ice_servers: Vec<String>,
    render: Arc<dyn RenderSink>,
    session: Option<PeerSession>,
    next_id: PeerSessionId,
    event_tx: mpsc::Sender<PeerEvent>,
}

impl NegotiationEngine {
    pub fn new(
        ice_servers: Vec<String>,
        render: Arc<dyn RenderSink>,
        event_tx: mpsc::Sender<PeerEvent>,
    ) -> Self {
        Self {
            ice_servers,
            render,
            session: None,
            next_id: PeerSessionId::first(),
            event_tx,
        }
    }

    pub fn current(&self) -> Option<PeerSessionId> {
        self.session.as_ref().map(PeerSession::id)
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Replaces any existing session with a fresh one for `sdp` and starts
    /// negotiating. The answer arrives later as [`PeerEvent::AnswerReady`].
    pub async fn handle_offer(&mut self, sdp: String) -> StatusUpdate {
        self.teardown().await;

        let id = self.next_id;
        self.next_id = id.next();

        match PeerSession::new(id, &self.ice_servers, self.event_tx.clone()).await {
            Ok(session) => {
                info!("Session {} created for incoming offer", id);
                session.start_negotiation(sdp, self.event_tx.clone());
                self.session = Some(session);
                StatusUpdate::setting_up_stream()
            }
            Err(e) => {
                error!("Failed to create peer connection for offer: {:?}", e);
                StatusUpdate::setup_failed()
            }
        }
    }

    /// Feeds a presenter candidate to the current session. Without a session
    /// this is a no-op; a bad candidate is logged and dropped.
    pub async fn handle_remote_candidate(&mut self, candidate: IceCandidatePayload) {
        let Some(session) = self.session.as_mut() else {
            debug!("No peer session, ignoring remote ICE candidate");
            return;
        };

        if let Err(e) = session.add_remote_candidate(candidate).await {
            warn!("Session {} rejected ICE candidate: {:?}", session.id(), e);
        }
    }

    /// Closes the current session, if any, and detaches its stream.
    pub async fn teardown(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        info!("Tearing down session {}", session.id());
        if session.has_stream() {
            self.render.detach();
        }
        if let Err(e) = session.close().await {
            warn!("Session {} did not close cleanly: {:?}", session.id(), e);
        }
    }

    /// Transition function for peer events. Events from any session other
    /// than the current one are dropped.
    pub async fn handle_event(
        &mut self,
        event: PeerEvent,
        signaling: &dyn SignalingOutput,
    ) -> Option<StatusUpdate> {
        let session = match self.session.as_mut() {
            Some(session) if session.id() == event.session() => session,
            _ => {
                debug!("Ignoring event from stale session {}", event.session());
                return None;
            }
        };

        match event {
            PeerEvent::RemoteDescriptionApplied(_) => {
                session.on_remote_applied().await;
                None
            }

            PeerEvent::AnswerReady(id, sdp) => {
                info!("Session {} sending answer", id);
                signaling.send_answer(sdp);
                for candidate in session.on_answer_sent() {
                    signaling.send_ice(candidate);
                }
                None
            }

            PeerEvent::SetupFailed(id, reason) => {
                error!("Session {} setup failed: {}", id, reason);
                Some(StatusUpdate::setup_failed())
            }

            PeerEvent::TrackArrived(id, stream) => {
                if !session.mark_stream_attached() {
                    debug!("Session {} already has a stream attached", id);
                    return None;
                }
                info!("Session {} attaching stream {}", id, stream.stream_id());
                self.render.attach(stream);
                Some(StatusUpdate::live())
            }

            PeerEvent::LocalCandidate(_, candidate) => {
                if let Some(candidate) = session.hold_local_candidate(candidate) {
                    signaling.send_ice(candidate);
                }
                None
            }

            PeerEvent::IceStateChanged(id, state) => {
                info!("Session {} ICE connection {}", id, state);
                ice_state_status(state)
            }
        }
    }
}

fn ice_state_status(state: RTCIceConnectionState) -> Option<StatusUpdate> {
    match state {
        RTCIceConnectionState::Connected | RTCIceConnectionState::Completed => {
            Some(StatusUpdate::live())
        }
        RTCIceConnectionState::Disconnected => Some(StatusUpdate::ice_reconnecting()),
        RTCIceConnectionState::Failed => Some(StatusUpdate::stream_interrupted()),
        _ => None,
    }
}
