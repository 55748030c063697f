use crate::error::ViewerError;
use mirror_core::RoomId;
use mirror_core::utils::{DEV_RELAY_URL, PROD_RELAY_URL, ROOM_QUERY_PARAM, is_loopback_host};
use url::Url;

/// Where the viewer was launched from: the host it was served on and the raw
/// `room` parameter, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchContext {
    host: String,
    room: Option<String>,
}

impl LaunchContext {
    pub fn new(host: impl Into<String>, room: Option<String>) -> Self {
        Self {
            host: host.into(),
            room,
        }
    }

    /// Parses a launch URL such as `https://mirror.example/view?room=ABC123`.
    pub fn from_url(raw: &str) -> Result<Self, ViewerError> {
        let url = Url::parse(raw)?;
        let host = url.host_str().ok_or(ViewerError::MissingHost)?.to_owned();
        let room = url
            .query_pairs()
            .find(|(key, _)| key == ROOM_QUERY_PARAM)
            .map(|(_, value)| value.into_owned());

        Ok(Self { host, room })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn room_id(&self) -> Result<RoomId, ViewerError> {
        self.room
            .as_deref()
            .and_then(RoomId::parse)
            .ok_or(ViewerError::MissingRoomId)
    }

    pub fn is_loopback(&self) -> bool {
        is_loopback_host(&self.host)
    }

    pub fn relay_url(&self) -> &'static str {
        if self.is_loopback() {
            DEV_RELAY_URL
        } else {
            PROD_RELAY_URL
        }
    }
}
