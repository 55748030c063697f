use tokio::sync::mpsc;

/// Events raised by a relay connection, tagged with the generation of the
/// connection that produced them.
#[derive(Debug)]
pub enum SignalingEvent {
    /// Socket is open; `outbound` feeds its writer.
    Opened {
        generation: u64,
        outbound: mpsc::UnboundedSender<String>,
    },

    /// A text frame from the relay.
    Frame { generation: u64, text: String },

    /// Transport error. Always followed by `Closed`.
    Error { generation: u64, reason: String },

    /// The connection is gone, for whatever reason.
    Closed { generation: u64 },
}

impl SignalingEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Opened { generation, .. }
            | Self::Frame { generation, .. }
            | Self::Error { generation, .. }
            | Self::Closed { generation } => *generation,
        }
    }
}
