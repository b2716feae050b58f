//! Error types for pipecall

use thiserror::Error;

/// Result type for pipecall operations
pub type Result<T> = std::result::Result<T, RpcError>;

/// Errors raised at the call site, as opposed to [`Outcome`](crate::Outcome)
/// variants which report what happened to a call that made it onto the wire.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Malformed call rejected before any I/O
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Channel could not be opened
    #[error("Channel unavailable: {0}")]
    ChannelUnavailable(String),

    /// I/O failure mid-operation
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RpcError {
    fn from(err: serde_json::Error) -> Self {
        RpcError::Serialization(err.to_string())
    }
}
