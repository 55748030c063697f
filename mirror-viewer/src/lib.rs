mod config;
mod error;
mod negotiation;
mod session;
mod signaling;
mod sink;

pub use config::*;
pub use error::*;
pub use negotiation::*;
pub use session::*;
pub use signaling::*;
pub use sink::*;

pub use mirror_core::{ConnectionState, IceCandidatePayload, RoomId, SignalMessage, StatusUpdate};
