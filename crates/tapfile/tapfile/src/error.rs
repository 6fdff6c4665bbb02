use tapfile_apdu_core::StatusWord;
use tapfile_apdu_core::response::error::{ResponseError, StatusError};
use tapfile_apdu_core::transport::TransportError;

/// Result type for file transfer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for file transfer operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The channel to the card failed before a response arrived
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The card answered with a status word other than 90 00
    #[error("Card answered {status} ({})", .status.description())]
    Status {
        /// Status word reported by the card
        status: StatusWord,
    },

    /// The response is too short to carry a status word
    #[error("Malformed response: {length} byte(s), at least 2 are required")]
    MalformedResponse {
        /// Number of bytes actually received
        length: usize,
    },

    /// The SELECT response does not carry the 4 byte file size
    #[error("SELECT response carries {length} payload byte(s), the 4 byte size field is missing")]
    MissingSizeField {
        /// Payload length of the SELECT response
        length: usize,
    },

    /// The card reported success for a READ BINARY but returned no data
    #[error("Card returned no data at offset {offset}")]
    ZeroProgress {
        /// Offset of the read that made no progress
        offset: usize,
    },

    /// The next read cannot be addressed through P1/P2
    #[error("Offset {offset} is beyond the 16-bit READ BINARY address space")]
    OffsetOverflow {
        /// Offset that would have been requested
        offset: usize,
    },

    /// The sender did not provide a usable checksum
    #[error("Checksum unavailable: {0}")]
    ChecksumUnavailable(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(&'static str),

    /// Response payload does not have the expected shape
    #[error("Invalid data: {0}")]
    InvalidData(&'static str),

    /// Local storage failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Status word carried by the error, if the card produced one
    pub const fn status(&self) -> Option<StatusWord> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the card was never reached
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<StatusError> for Error {
    fn from(error: StatusError) -> Self {
        Self::Status {
            status: error.status,
        }
    }
}

impl From<ResponseError> for Error {
    fn from(error: ResponseError) -> Self {
        match error {
            ResponseError::Malformed { length } => Self::MalformedResponse { length },
            ResponseError::Parse(message) => Self::InvalidData(message),
            ResponseError::Status(status) => status.into(),
        }
    }
}

impl From<tapfile_apdu_core::Error> for Error {
    fn from(error: tapfile_apdu_core::Error) -> Self {
        match error {
            tapfile_apdu_core::Error::Transport(e) => e.into(),
            tapfile_apdu_core::Error::Response(e) => e.into(),
            tapfile_apdu_core::Error::InvalidCommandLength(_) => {
                Self::InvalidData("command does not fit a short APDU")
            }
            tapfile_apdu_core::Error::InvalidCommandData(message) => Self::InvalidData(message),
        }
    }
}
