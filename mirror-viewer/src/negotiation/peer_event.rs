use crate::sink::RemoteStream;
use mirror_core::IceCandidatePayload;
use std::fmt;
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;

/// Identifies one peer connection for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerSessionId(u64);

impl PeerSessionId {
    pub fn first() -> Self {
        Self(1)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for PeerSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything a peer connection reports back to the engine.
#[derive(Debug)]
pub enum PeerEvent {
    /// The offer has been applied; buffered remote candidates may go in.
    RemoteDescriptionApplied(PeerSessionId),

    /// Local description is set; the answer SDP is ready to send.
    AnswerReady(PeerSessionId, String),

    /// Applying the offer or producing the answer failed.
    SetupFailed(PeerSessionId, String),

    /// An inbound media track started.
    TrackArrived(PeerSessionId, RemoteStream),

    /// ICE gathered a local candidate.
    LocalCandidate(PeerSessionId, IceCandidatePayload),

    IceStateChanged(PeerSessionId, RTCIceConnectionState),
}

impl PeerEvent {
    pub fn session(&self) -> PeerSessionId {
        match self {
            Self::RemoteDescriptionApplied(id)
            | Self::AnswerReady(id, _)
            | Self::SetupFailed(id, _)
            | Self::TrackArrived(id, _)
            | Self::LocalCandidate(id, _)
            | Self::IceStateChanged(id, _) => *id,
        }
    }
}
