//! Client error type.

use teleop_common::protocol::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("could not connect to {addr}: {reason}")]
    Connect { addr: String, reason: String },

    #[error("connection closed before a reply arrived")]
    Closed,

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Process exit status: 2 for bad operator input, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnknownPreset(_) | Self::InvalidJson(_) => 2,
            _ => 1,
        }
    }
}
