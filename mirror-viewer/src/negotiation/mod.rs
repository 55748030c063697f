mod negotiation_engine;
mod peer_event;
mod peer_session;

pub use negotiation_engine::*;
pub use peer_event::*;
pub use peer_session::*;
