use crate::config::LaunchContext;
use crate::error::ViewerError;
use mirror_core::RoomId;
use mirror_core::utils::{RECONNECT_DELAY, default_stun_servers};
use std::time::Duration;

/// Everything a session needs to run.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub room_id: RoomId,
    pub relay_url: String,
    /// STUN urls handed to every peer connection. Empty means host candidates only.
    pub ice_servers: Vec<String>,
    pub reconnect_delay: Duration,
}

impl ViewerConfig {
    pub fn new(room_id: RoomId, relay_url: impl Into<String>) -> Self {
        Self {
            room_id,
            relay_url: relay_url.into(),
            ice_servers: default_stun_servers(),
            reconnect_delay: RECONNECT_DELAY,
        }
    }

    pub fn from_launch(launch: &LaunchContext) -> Result<Self, ViewerError> {
        let room_id = launch.room_id()?;
        Ok(Self::new(room_id, launch.relay_url()))
    }

    pub fn with_relay_url(mut self, relay_url: impl Into<String>) -> Self {
        self.relay_url = relay_url.into();
        self
    }

    pub fn with_ice_servers(mut self, ice_servers: Vec<String>) -> Self {
        self.ice_servers = ice_servers;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}
