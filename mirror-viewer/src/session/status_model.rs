use crate::sink::StatusSink;
use mirror_core::{ConnectionState, StatusUpdate};
use std::sync::Arc;
use tracing::debug;

/// Last status pushed to the presentation layer.
pub struct StatusModel {
    sink: Arc<dyn StatusSink>,
    current: StatusUpdate,
}

impl StatusModel {
    pub fn new(sink: Arc<dyn StatusSink>) -> Self {
        Self {
            sink,
            current: StatusUpdate::idle(),
        }
    }

    pub fn apply(&mut self, update: StatusUpdate) {
        debug!("Status -> {}: {}", update.state, update.message);
        self.sink.set_status(update.state, &update.message);
        self.sink
            .set_overlay(&update.overlay.title, &update.overlay.subtitle);
        self.current = update;
    }

    pub fn state(&self) -> ConnectionState {
        self.current.state
    }
}
