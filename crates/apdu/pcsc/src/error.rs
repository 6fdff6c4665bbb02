//! Error types for PC/SC transport

use tapfile_apdu_core::TransportError;

/// PC/SC-specific errors
#[derive(Debug, thiserror::Error)]
pub enum PcscError {
    /// PC/SC error
    #[error("PC/SC error: {0}")]
    Pcsc(#[from] pcsc::Error),

    /// No readers available
    #[error("No readers available")]
    NoReadersAvailable,

    /// Reader not found
    #[error("Reader not found: {0}")]
    ReaderNotFound(String),

    /// No card present in reader
    #[error("No card present in reader: {0}")]
    NoCard(String),
}

impl From<PcscError> for TransportError {
    fn from(error: PcscError) -> Self {
        match error {
            PcscError::Pcsc(pcsc::Error::InsufficientBuffer) => Self::BufferTooSmall,
            PcscError::Pcsc(pcsc::Error::Timeout) => Self::Timeout,
            PcscError::Pcsc(pcsc::Error::ResetCard | pcsc::Error::RemovedCard) => Self::CardGone,
            PcscError::Pcsc(e) => Self::Driver(e as i32),
            PcscError::NoReadersAvailable | PcscError::ReaderNotFound(_) => Self::Device,
            PcscError::NoCard(_) => Self::Connection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_removal_maps_to_card_gone() {
        let err: TransportError = PcscError::Pcsc(pcsc::Error::RemovedCard).into();
        assert_eq!(err, TransportError::CardGone);
    }

    #[test]
    fn missing_card_maps_to_connection() {
        let err: TransportError = PcscError::NoCard("ACS ACR122U".into()).into();
        assert_eq!(err, TransportError::Connection);
    }
}
