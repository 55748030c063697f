use mirror_core::ConnectionState;

/// Implemented by the presentation layer (status dot, overlay text).
///
/// Both methods are called on every state transition, in this order.
pub trait StatusSink: Send + Sync {
    fn set_status(&self, state: ConnectionState, message: &str);

    fn set_overlay(&self, title: &str, subtitle: &str);
}
