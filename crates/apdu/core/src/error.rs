//! Core error type for APDU operations
//!
//! Transport and response failures keep their own error types so that callers can tell a
//! broken channel apart from a card that answered with a failure status word. This type
//! wraps both together with command encoding errors.

use crate::response::error::ResponseError;
use crate::transport::TransportError;

/// Result type for core APDU operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Core error type that encompasses all possible errors in the crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Channel level failure, the card never produced a response
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The card produced a response that is malformed or carries a failure status
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// Invalid command length
    #[error("Invalid command length: {0}")]
    InvalidCommandLength(usize),

    /// Invalid command data
    #[error("Invalid command data: {0}")]
    InvalidCommandData(&'static str),
}

impl Error {
    /// Returns true if the error originated in the transport rather than the card
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
