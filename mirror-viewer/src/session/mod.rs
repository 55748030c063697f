mod session_command;
mod session_controller;
mod status_model;

pub use session_command::*;
pub use session_controller::*;
pub use status_model::*;
