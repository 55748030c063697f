use colored::*;
use mirror_viewer::{ConnectionState, StatusSink};
use std::sync::atomic::{AtomicBool, Ordering};

/// Prints the status dot and overlay as coloured terminal lines.
#[derive(Default)]
pub struct TerminalStatus {
    /// Whether the last state shows the overlay; updated before each overlay call.
    overlay_visible: AtomicBool,
}

impl TerminalStatus {
    pub fn new() -> Self {
        Self::default()
    }

    fn overlay_line(&self, title: &str, subtitle: &str) -> Option<String> {
        if !self.overlay_visible.load(Ordering::Relaxed) || title.is_empty() {
            return None;
        }
        if subtitle.is_empty() {
            Some(format!("    {}", title.dimmed()))
        } else {
            Some(format!("    {} · {}", title.dimmed(), subtitle.dimmed()))
        }
    }
}

fn dot(state: ConnectionState) -> ColoredString {
    match state {
        ConnectionState::Live => "●".green(),
        ConnectionState::Failed => "●".red(),
        ConnectionState::Reconnecting => "●".yellow(),
        ConnectionState::Idle => "●".dimmed(),
        ConnectionState::Connecting
        | ConnectionState::WaitingForPeer
        | ConnectionState::Negotiating => "●".cyan(),
    }
}

impl StatusSink for TerminalStatus {
    fn set_status(&self, state: ConnectionState, message: &str) {
        self.overlay_visible
            .store(state.shows_overlay(), Ordering::Relaxed);
        println!("{} {:<17} {}", dot(state), state.as_str().bold(), message);
    }

    fn set_overlay(&self, title: &str, subtitle: &str) {
        if let Some(line) = self.overlay_line(title, subtitle) {
            println!("{line}");
        }
    }
}
