use serde_json::json;

use mirror_viewer::ConnectionState;

use crate::integration::{init_tracing, start_joined_viewer};
use crate::utils::{MockRelay, SIGNAL_TIMEOUT_MS, TestPresenter};

#[tokio::test]
async fn test_bad_offer_recovers() {
    init_tracing();

    let mut relay = MockRelay::start().await.expect("Failed to start relay");
    let (handle, status, render) = start_joined_viewer(&mut relay).await;

    relay
        .broadcast(json!({ "type": "offer", "sdp": "not an sdp" }))
        .await;
    assert!(
        status
            .wait_for_message("Stream setup failed", SIGNAL_TIMEOUT_MS)
            .await,
        "Garbage offer should fail setup"
    );
    assert_eq!(status.last().unwrap().state, ConnectionState::Failed);
    assert_eq!(
        status.last_overlay(),
        Some((
            "Error".to_string(),
            "Failed to establish video stream".to_string()
        ))
    );
    assert!(render.attached_streams().is_empty());

    // A proper offer afterwards is answered normally.
    let presenter = TestPresenter::new()
        .await
        .expect("Failed to create presenter");
    let offer = presenter.create_offer().await.expect("Failed to create offer");
    relay.broadcast(json!({ "type": "offer", "sdp": offer })).await;

    let answer = relay
        .expect_frame("answer", SIGNAL_TIMEOUT_MS)
        .await
        .expect("Viewer should answer the second offer");
    assert!(answer["sdp"].as_str().is_some_and(|s| s.starts_with("v=0")));
    assert_eq!(answer["roomId"], crate::integration::TEST_ROOM);
    assert!(
        status
            .wait_for_state(ConnectionState::Negotiating, SIGNAL_TIMEOUT_MS)
            .await
    );

    handle.shutdown().await;
}

#[tokio::test]
async fn test_offer_without_sdp_fails_setup() {
    init_tracing();

    let mut relay = MockRelay::start().await.expect("Failed to start relay");
    let (handle, status, render) = start_joined_viewer(&mut relay).await;

    relay.broadcast(json!({ "type": "offer" })).await;
    assert!(
        status
            .wait_for_message("Stream setup failed", SIGNAL_TIMEOUT_MS)
            .await,
        "Offer without SDP should fail setup"
    );
    assert_eq!(status.last().unwrap().state, ConnectionState::Failed);
    assert!(render.attached_streams().is_empty());

    let replies = relay.drain_frames(300).await;
    assert!(
        replies.iter().all(|f| f["type"] != "answer"),
        "No answer for an offer without SDP"
    );

    handle.shutdown().await;
}
