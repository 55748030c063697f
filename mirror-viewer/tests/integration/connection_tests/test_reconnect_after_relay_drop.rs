use std::time::{Duration, Instant};

use mirror_viewer::ConnectionState;

use crate::integration::{TEST_RECONNECT_DELAY, TEST_ROOM, init_tracing, start_joined_viewer};
use crate::utils::{MockRelay, SIGNAL_TIMEOUT_MS};

#[tokio::test]
async fn test_reconnect_after_relay_drop() {
    init_tracing();

    let mut relay = MockRelay::start().await.expect("Failed to start relay");
    let (handle, status, _render) = start_joined_viewer(&mut relay).await;

    let kicked_at = Instant::now();
    relay.kick_all().await;

    assert!(
        status
            .wait_for_state(ConnectionState::Reconnecting, SIGNAL_TIMEOUT_MS)
            .await,
        "Dropped relay should report reconnecting"
    );
    assert_eq!(status.last().unwrap().message, "Connection lost");

    let rejoin = relay
        .expect_frame("join-room", SIGNAL_TIMEOUT_MS)
        .await
        .expect("Viewer should rejoin after the delay");
    assert!(
        kicked_at.elapsed() >= TEST_RECONNECT_DELAY,
        "Rejoined before the reconnect delay"
    );
    assert_eq!(rejoin["roomId"], TEST_ROOM);

    // One close schedules one reconnect.
    let extra = relay.drain_frames(3 * TEST_RECONNECT_DELAY.as_millis() as u64).await;
    assert!(
        extra.iter().all(|f| f["type"] != "join-room"),
        "Only one reconnect expected, got {:?}",
        extra
    );
    assert_eq!(relay.connection_count().await, 1);

    assert!(
        status
            .wait_for_state(ConnectionState::WaitingForPeer, SIGNAL_TIMEOUT_MS)
            .await
    );

    handle.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_relay_keeps_retrying() {
    init_tracing();

    // Bind then drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let status = crate::utils::RecordingStatusSink::new();
    let config = mirror_viewer::ViewerConfig::new(
        mirror_viewer::RoomId::parse(TEST_ROOM).unwrap(),
        format!("ws://{}", addr),
    )
    .with_ice_servers(vec![])
    .with_reconnect_delay(TEST_RECONNECT_DELAY);

    let handle = mirror_viewer::SessionController::start(
        config,
        std::sync::Arc::new(status.clone()),
        std::sync::Arc::new(crate::utils::RecordingRenderSink::new()),
    );

    tokio::time::sleep(TEST_RECONNECT_DELAY * 3 + Duration::from_millis(200)).await;

    let history = status.history();
    assert!(
        history.iter().any(|s| s.message == "Connection failed"),
        "Failed connect reports a channel error: {:?}",
        history
    );
    let attempts = history
        .iter()
        .filter(|s| s.state == ConnectionState::Connecting)
        .count();
    assert!(attempts >= 2, "Expected repeated attempts, got {}", attempts);

    handle.shutdown().await;
}
