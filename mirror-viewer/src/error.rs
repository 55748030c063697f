use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    /// The launch context carried no usable `room` parameter.
    #[error("no room id provided")]
    MissingRoomId,

    #[error("invalid launch url: {0}")]
    InvalidLaunchUrl(#[from] url::ParseError),

    #[error("launch url has no host")]
    MissingHost,

    #[error("failed to encode signal message: {0}")]
    Serialization(#[from] serde_json::Error),
}
