mod room;
mod signaling;
mod status;

pub use room::RoomId;
pub use signaling::{IceCandidatePayload, SignalMessage};
pub use status::{ConnectionState, Overlay, StatusUpdate};
