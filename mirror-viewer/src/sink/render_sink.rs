use std::fmt;
use std::sync::Arc;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::track::track_remote::TrackRemote;

/// Inbound media stream handed to the rendering sink.
#[derive(Clone)]
pub struct RemoteStream {
    stream_id: String,
    track: Arc<TrackRemote>,
}

impl RemoteStream {
    pub fn new(track: Arc<TrackRemote>) -> Self {
        Self {
            stream_id: track.stream_id(),
            track,
        }
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn kind(&self) -> RTPCodecType {
        self.track.kind()
    }

    pub fn track(&self) -> &Arc<TrackRemote> {
        &self.track
    }
}

impl fmt::Debug for RemoteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteStream")
            .field("stream_id", &self.stream_id)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Playback surface for the presenter's stream.
pub trait RenderSink: Send + Sync {
    fn attach(&self, stream: RemoteStream);

    fn detach(&self);
}
