/// Commands sent to a running session from outside its event loop.
#[derive(Debug)]
pub enum SessionCommand {
    /// Close the peer connection and the relay socket, then stop.
    Shutdown,
}
