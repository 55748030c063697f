mod launch_context;
mod viewer_config;

pub use launch_context::*;
pub use viewer_config::*;
