pub mod negotiation_tests;

use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

use mirror_viewer::{RoomId, SessionController, SessionHandle, ViewerConfig};

use crate::utils::{MockRelay, RecordingRenderSink, RecordingStatusSink, SIGNAL_TIMEOUT_MS};

pub const TEST_ROOM: &str = "ABC123";

/// Short enough to keep tests fast, long enough to observe.
pub const TEST_RECONNECT_DELAY: Duration = Duration::from_millis(300);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn test_config(relay: &MockRelay) -> ViewerConfig {
    ViewerConfig::new(RoomId::parse(TEST_ROOM).unwrap(), relay.url.clone())
        .with_ice_servers(vec![])
        .with_reconnect_delay(TEST_RECONNECT_DELAY)
}

/// Starts a viewer against `relay` and waits until it has joined the room.
pub async fn start_joined_viewer(
    relay: &mut MockRelay,
) -> (SessionHandle, RecordingStatusSink, RecordingRenderSink) {
    let status = RecordingStatusSink::new();
    let render = RecordingRenderSink::new();

    let handle = SessionController::start(
        test_config(relay),
        Arc::new(status.clone()),
        Arc::new(render.clone()),
    );

    relay
        .expect_frame("join-room", SIGNAL_TIMEOUT_MS)
        .await
        .expect("viewer should join the room");

    (handle, status, render)
}
