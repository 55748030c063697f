use serde_json::json;

use mirror_viewer::ConnectionState;

use crate::integration::{init_tracing, start_joined_viewer};
use crate::utils::{
    MEDIA_TIMEOUT_MS, MockRelay, PRESENTER_STREAM_ID, SIGNAL_TIMEOUT_MS, TestPresenter,
    perform_negotiation,
};

#[tokio::test]
async fn test_full_stream_cycle() {
    init_tracing();

    let mut relay = MockRelay::start().await.expect("Failed to start relay");
    let (handle, status, render) = start_joined_viewer(&mut relay).await;

    let mut presenter = TestPresenter::new()
        .await
        .expect("Failed to create presenter");

    perform_negotiation(&presenter, &mut relay)
        .await
        .expect("Negotiation failed");
    assert!(
        status.states().contains(&ConnectionState::Negotiating),
        "Offer should move through negotiating"
    );

    presenter.start_video();

    assert!(
        render.wait_for_attach(MEDIA_TIMEOUT_MS).await,
        "Remote stream never attached"
    );
    assert!(
        status
            .wait_for_state(ConnectionState::Live, MEDIA_TIMEOUT_MS)
            .await,
        "Viewer should go live"
    );
    assert_eq!(status.last().unwrap().message, "Live");

    // Let more packets arrive; the sink is still attached only once.
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    assert_eq!(render.attached_streams(), vec![PRESENTER_STREAM_ID.to_string()]);
    assert_eq!(render.detach_count(), 0);

    relay.broadcast(json!({ "type": "presenter-left" })).await;
    assert!(
        status
            .wait_for_message("Presenter disconnected", SIGNAL_TIMEOUT_MS)
            .await
    );
    assert_eq!(status.last().unwrap().state, ConnectionState::WaitingForPeer);
    assert_eq!(render.detach_count(), 1, "Presenter leaving detaches the stream");

    presenter.close().await.expect("Failed to close presenter");
    handle.shutdown().await;

    assert_eq!(render.detach_count(), 1, "Shutdown after teardown detaches nothing");
}
