use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use mirror_viewer::{RemoteStream, RenderSink};

const REPORT_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Default)]
struct Counters {
    packets: AtomicU64,
    bytes: AtomicU64,
}

/// Stands in for a video element: drains the attached track and counts
/// what arrives.
#[derive(Default)]
pub struct TrackStats {
    counters: Arc<Counters>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl TrackStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} packets, {} bytes received",
            self.counters.packets.load(Ordering::Relaxed),
            self.counters.bytes.load(Ordering::Relaxed)
        )
    }

    fn stop_reader(&self) {
        let reader = match self.reader.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(reader) = reader {
            reader.abort();
        }
    }
}

impl RenderSink for TrackStats {
    fn attach(&self, stream: RemoteStream) {
        self.stop_reader();
        info!("Attached {:?}", stream);

        let counters = Arc::clone(&self.counters);
        let track = Arc::clone(stream.track());
        let reader = tokio::spawn(async move {
            let mut last_report = tokio::time::Instant::now();
            loop {
                match track.read_rtp().await {
                    Ok((packet, _)) => {
                        counters.packets.fetch_add(1, Ordering::Relaxed);
                        counters
                            .bytes
                            .fetch_add(packet.payload.len() as u64, Ordering::Relaxed);
                    }
                    Err(e) => {
                        debug!("Track reader stopped: {}", e);
                        break;
                    }
                }

                if last_report.elapsed() >= REPORT_INTERVAL {
                    info!(
                        "Received {} packets so far",
                        counters.packets.load(Ordering::Relaxed)
                    );
                    last_report = tokio::time::Instant::now();
                }
            }
        });

        match self.reader.lock() {
            Ok(mut guard) => *guard = Some(reader),
            Err(poisoned) => *poisoned.into_inner() = Some(reader),
        }
    }

    fn detach(&self) {
        info!("Detached stream after {}", self.summary());
        self.stop_reader();
    }
}
