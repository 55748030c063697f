mod reconnect_timer;
mod signaling_client;
mod signaling_event;
mod signaling_output;

pub use reconnect_timer::*;
pub use signaling_client::*;
pub use signaling_event::*;
pub use signaling_output::*;
