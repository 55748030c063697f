use mirror_core::IceCandidatePayload;

/// Outbound half of signaling as seen by the negotiation engine.
pub trait SignalingOutput: Send + Sync {
    /// Send the SDP answer for the current offer.
    fn send_answer(&self, sdp: String);

    /// Send a locally gathered ICE candidate.
    fn send_ice(&self, candidate: IceCandidatePayload);
}
