use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

/// Connectivity candidate as it travels over the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceCandidatePayload {
    pub candidate: String,
    #[serde(rename = "sdpMLineIndex", default)]
    pub sdp_m_line_index: Option<u16>,
    #[serde(rename = "sdpMid", default)]
    pub sdp_mid: Option<String>,
}

/// Frames exchanged with the relay, discriminated by `type`.
///
/// Unknown discriminators decode to [`SignalMessage::Unknown`] so that newer
/// relays can add message types without breaking older viewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalMessage {
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: RoomId },
    JoinedRoom,
    Error {
        #[serde(default)]
        message: Option<String>,
    },
    Offer {
        #[serde(default)]
        sdp: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Answer { room_id: RoomId, sdp: String },
    #[serde(rename_all = "camelCase")]
    IceCandidate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<RoomId>,
        #[serde(default)]
        candidate: Option<IceCandidatePayload>,
    },
    PresenterLeft,
    #[serde(other)]
    Unknown,
}

impl SignalMessage {
    pub fn join_room(room_id: RoomId) -> Self {
        Self::JoinRoom { room_id }
    }

    pub fn answer(room_id: RoomId, sdp: String) -> Self {
        Self::Answer { room_id, sdp }
    }

    pub fn local_candidate(room_id: RoomId, candidate: IceCandidatePayload) -> Self {
        Self::IceCandidate {
            room_id: Some(room_id),
            candidate: Some(candidate),
        }
    }

    /// Wire name of the frame, used for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinRoom { .. } => "join-room",
            Self::JoinedRoom => "joined-room",
            Self::Error { .. } => "error",
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::IceCandidate { .. } => "ice-candidate",
            Self::PresenterLeft => "presenter-left",
            Self::Unknown => "unknown",
        }
    }
}
