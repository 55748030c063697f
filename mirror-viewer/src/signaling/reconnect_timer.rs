use std::future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{Sleep, sleep};

/// Single-shot reconnect delay. At most one reconnect is ever pending.
pub struct ReconnectTimer {
    delay: Duration,
    pending: Option<Pin<Box<Sleep>>>,
}

impl ReconnectTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arms the timer. Returns `false` if a reconnect was already pending.
    pub fn schedule(&mut self) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(Box::pin(sleep(self.delay)));
        true
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolves when the armed delay elapses; never resolves while disarmed.
    /// Cancel safe: dropping the future keeps the deadline.
    pub async fn fired(&mut self) {
        match self.pending.as_mut() {
            Some(pending) => {
                pending.await;
                self.pending = None;
            }
            None => future::pending().await,
        }
    }
}
