use crate::negotiation::{PeerEvent, PeerSessionId};
use crate::sink::RemoteStream;
use anyhow::{Context, Result};
use mirror_core::IceCandidatePayload;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::track::track_remote::TrackRemote;

/// One receive-only peer connection plus the bookkeeping that belongs to it.
pub struct PeerSession {
    id: PeerSessionId,
    peer_connection: Arc<RTCPeerConnection>,
    remote_applied: bool,
    answer_sent: bool,
    stream_attached: bool,
    /// Remote candidates that arrived before the offer was applied.
    pending_remote: Vec<RTCIceCandidateInit>,
    /// Local candidates gathered before the answer went out.
    pending_local: Vec<IceCandidatePayload>,
}

impl PeerSession {
    /// Builds the peer connection and wires its callbacks into `event_tx`.
    ///
    /// Every event is tagged with `id` so the owner can discard callbacks
    /// from a session it has already torn down.
    pub async fn new(
        id: PeerSessionId,
        ice_servers: &[String],
        event_tx: mpsc::Sender<PeerEvent>,
    ) -> Result<Self> {
        // 1. Codecs the presenter may offer
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        // 2. Default interceptors (NACK, RTCP reports)
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        // 3. API object
        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        // 4. ICE servers; an empty list means host candidates only
        let ice_servers = if ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: ice_servers.to_vec(),
                ..Default::default()
            }]
        };

        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        // 5. Peer connection
        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );

        // Callbacks only post events; the engine owns all state.

        // A. Inbound media
        let track_tx = event_tx.clone();
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                Box::pin(async move {
                    info!(
                        "Session {} received {} track (stream {})",
                        id,
                        track.kind(),
                        track.stream_id()
                    );
                    let _ = tx
                        .send(PeerEvent::TrackArrived(id, RemoteStream::new(track)))
                        .await;
                })
            },
        ));

        // B. Local candidates (end-of-gathering `None` is skipped)
        let ice_tx = event_tx.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx
                    .send(PeerEvent::LocalCandidate(id, from_candidate_init(init)))
                    .await;
            })
        }));

        // C. ICE connectivity
        let state_tx = event_tx;
        peer_connection.on_ice_connection_state_change(Box::new(
            move |state: RTCIceConnectionState| {
                let tx = state_tx.clone();
                Box::pin(async move {
                    debug!("Session {} ICE connection state: {}", id, state);
                    let _ = tx.send(PeerEvent::IceStateChanged(id, state)).await;
                })
            },
        ));

        Ok(Self {
            id,
            peer_connection,
            remote_applied: false,
            answer_sent: false,
            stream_attached: false,
            pending_remote: Vec::new(),
            pending_local: Vec::new(),
        })
    }

    pub fn id(&self) -> PeerSessionId {
        self.id
    }

    /// Applies `offer_sdp` and produces an answer in the background.
    ///
    /// Reports `RemoteDescriptionApplied`, then `AnswerReady` or `SetupFailed`.
    pub fn start_negotiation(&self, offer_sdp: String, event_tx: mpsc::Sender<PeerEvent>) {
        let peer_connection = self.peer_connection.clone();
        let id = self.id;

        tokio::spawn(async move {
            let event = match negotiate(&peer_connection, offer_sdp, id, &event_tx).await {
                Ok(answer_sdp) => PeerEvent::AnswerReady(id, answer_sdp),
                Err(e) => PeerEvent::SetupFailed(id, format!("{:#}", e)),
            };
            let _ = event_tx.send(event).await;
        });
    }

    /// Adds a remote candidate, or holds it until the offer is applied.
    pub async fn add_remote_candidate(&mut self, candidate: IceCandidatePayload) -> Result<()> {
        let init = to_candidate_init(candidate);
        if !self.remote_applied {
            debug!("Session {} buffering early remote candidate", self.id);
            self.pending_remote.push(init);
            return Ok(());
        }

        self.peer_connection
            .add_ice_candidate(init)
            .await
            .context("Failed to add ICE candidate")?;
        Ok(())
    }

    /// Marks the offer applied and replays buffered remote candidates.
    pub async fn on_remote_applied(&mut self) {
        self.remote_applied = true;

        for init in std::mem::take(&mut self.pending_remote) {
            if let Err(e) = self.peer_connection.add_ice_candidate(init).await {
                warn!("Session {} failed to add buffered ICE candidate: {:?}", self.id, e);
            }
        }
    }

    /// Holds a local candidate until the answer is out. Returns it back if
    /// the answer has already been sent.
    pub fn hold_local_candidate(
        &mut self,
        candidate: IceCandidatePayload,
    ) -> Option<IceCandidatePayload> {
        if self.answer_sent {
            return Some(candidate);
        }
        self.pending_local.push(candidate);
        None
    }

    /// Marks the answer sent and hands back the local candidates held so far.
    pub fn on_answer_sent(&mut self) -> Vec<IceCandidatePayload> {
        self.answer_sent = true;
        std::mem::take(&mut self.pending_local)
    }

    /// Returns `true` only for the first stream of this session.
    pub fn mark_stream_attached(&mut self) -> bool {
        !std::mem::replace(&mut self.stream_attached, true)
    }

    pub fn has_stream(&self) -> bool {
        self.stream_attached
    }

    pub fn pending_remote_candidates(&self) -> usize {
        self.pending_remote.len()
    }

    pub async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

async fn negotiate(
    peer_connection: &RTCPeerConnection,
    offer_sdp: String,
    id: PeerSessionId,
    event_tx: &mpsc::Sender<PeerEvent>,
) -> Result<String> {
    let offer = RTCSessionDescription::offer(offer_sdp).context("Invalid offer SDP")?;
    peer_connection
        .set_remote_description(offer)
        .await
        .context("Failed to set remote description")?;

    let _ = event_tx.send(PeerEvent::RemoteDescriptionApplied(id)).await;

    let answer = peer_connection
        .create_answer(None)
        .await
        .context("Failed to create answer")?;
    peer_connection
        .set_local_description(answer.clone())
        .await
        .context("Failed to set local description")?;

    Ok(answer.sdp)
}

fn to_candidate_init(candidate: IceCandidatePayload) -> RTCIceCandidateInit {
    RTCIceCandidateInit {
        candidate: candidate.candidate,
        sdp_mid: candidate.sdp_mid,
        sdp_mline_index: candidate.sdp_m_line_index,
        ..Default::default()
    }
}

fn from_candidate_init(init: RTCIceCandidateInit) -> IceCandidatePayload {
    IceCandidatePayload {
        candidate: init.candidate,
        sdp_m_line_index: init.sdp_mline_index,
        sdp_mid: init.sdp_mid,
    }
}
