use serde::{Deserialize, Serialize};
use std::fmt;

/// Viewer-facing connection health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionState {
    Idle,
    Connecting,
    WaitingForPeer,
    Negotiating,
    Live,
    Reconnecting,
    Failed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::WaitingForPeer => "waiting-for-peer",
            Self::Negotiating => "negotiating",
            Self::Live => "live",
            Self::Reconnecting => "reconnecting",
            Self::Failed => "failed",
        }
    }

    /// The overlay covers the video surface in every state but `live`.
    pub fn shows_overlay(&self) -> bool {
        !matches!(self, Self::Live)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub title: String,
    pub subtitle: String,
}

/// One complete status projection: state, status line and overlay text.
///
/// Every constructor maps a single lifecycle event to its display, so the
/// current status never depends on anything but the last event applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub state: ConnectionState,
    pub message: String,
    pub overlay: Overlay,
}

impl StatusUpdate {
    fn new(state: ConnectionState, message: &str, title: &str, subtitle: &str) -> Self {
        Self {
            state,
            message: message.to_owned(),
            overlay: Overlay {
                title: title.to_owned(),
                subtitle: subtitle.to_owned(),
            },
        }
    }

    pub fn idle() -> Self {
        Self::new(ConnectionState::Idle, "Idle", "", "")
    }

    pub fn missing_room() -> Self {
        Self::new(
            ConnectionState::Failed,
            "No room ID provided",
            "No Room ID",
            "Add ?room=XXXX to the URL",
        )
    }

    pub fn connecting() -> Self {
        Self::new(
            ConnectionState::Connecting,
            "Connecting to server...",
            "Connecting...",
            "Establishing secure connection",
        )
    }

    pub fn waiting_for_presenter() -> Self {
        Self::new(
            ConnectionState::WaitingForPeer,
            "Waiting for presenter...",
            "Waiting for Presenter",
            "The presenter hasn't started sharing yet",
        )
    }

    pub fn joined_room() -> Self {
        Self::new(
            ConnectionState::WaitingForPeer,
            "In room, waiting for stream...",
            "Waiting for Presenter",
            "The presenter hasn't started sharing yet",
        )
    }

    pub fn relay_error(message: Option<&str>) -> Self {
        Self::new(
            ConnectionState::Failed,
            message.unwrap_or("Connection error"),
            "Error",
            message.unwrap_or("Could not join room"),
        )
    }

    pub fn setting_up_stream() -> Self {
        Self::new(
            ConnectionState::Negotiating,
            "Setting up stream...",
            "Setting Up Stream",
            "Negotiating with the presenter",
        )
    }

    pub fn presenter_left() -> Self {
        Self::new(
            ConnectionState::WaitingForPeer,
            "Presenter disconnected",
            "Disconnected",
            "The presenter has stopped sharing",
        )
    }

    pub fn connection_lost() -> Self {
        Self::new(
            ConnectionState::Reconnecting,
            "Connection lost",
            "Connection Lost",
            "Trying to reconnect...",
        )
    }

    pub fn channel_error() -> Self {
        Self::new(
            ConnectionState::Failed,
            "Connection failed",
            "Connection Failed",
            "Could not reach the server",
        )
    }

    pub fn live() -> Self {
        Self::new(ConnectionState::Live, "Live", "Live", "")
    }

    pub fn ice_reconnecting() -> Self {
        Self::new(
            ConnectionState::Reconnecting,
            "Reconnecting...",
            "Reconnecting...",
            "The stream connection dropped",
        )
    }

    pub fn stream_interrupted() -> Self {
        Self::new(
            ConnectionState::Failed,
            "Connection failed",
            "Connection Failed",
            "The stream was interrupted",
        )
    }

    pub fn setup_failed() -> Self {
        Self::new(
            ConnectionState::Failed,
            "Stream setup failed",
            "Error",
            "Failed to establish video stream",
        )
    }
}
