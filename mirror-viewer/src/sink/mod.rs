mod render_sink;
mod status_sink;

pub use render_sink::*;
pub use status_sink::*;
