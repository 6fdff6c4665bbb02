use bytes::Bytes;
use tapfile_apdu_core::{ApduCommand, ExpectedLength, Response};

use crate::constants::{
    CLA_ISO7816, FILE_TRANSFER_AID, SELECT_BY_NAME, SELECT_FIRST_OCCURRENCE, SIZE_FIELD_LEN, ins,
};
use crate::{Error, Result};

/// SELECT the file transfer application by AID
///
/// On success the card answers with the file size as a 4 byte big-endian integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectCommand {
    aid: Bytes,
}

impl SelectCommand {
    /// Select an arbitrary AID
    pub fn with_aid(aid: impl Into<Bytes>) -> Self {
        Self { aid: aid.into() }
    }

    /// Select the default file transfer application
    pub const fn file_transfer() -> Self {
        Self {
            aid: Bytes::from_static(&FILE_TRANSFER_AID),
        }
    }

    /// AID carried in the data field
    pub fn aid(&self) -> &[u8] {
        &self.aid
    }
}

impl ApduCommand for SelectCommand {
    /// Announced file size in bytes
    type Success = u32;
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO7816
    }

    fn instruction(&self) -> u8 {
        ins::SELECT
    }

    fn p1(&self) -> u8 {
        SELECT_BY_NAME
    }

    fn p2(&self) -> u8 {
        SELECT_FIRST_OCCURRENCE
    }

    fn data(&self) -> Option<&[u8]> {
        Some(&self.aid)
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        None
    }

    fn parse_response(response: Response) -> Result<u32> {
        let payload = super::success_payload(response)?;
        let size: [u8; SIZE_FIELD_LEN] = payload
            .get(..SIZE_FIELD_LEN)
            .and_then(|field| field.try_into().ok())
            .ok_or(Error::MissingSizeField {
                length: payload.len(),
            })?;
        Ok(u32::from_be_bytes(size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn select_encoding_has_no_le() {
        let cmd = SelectCommand::file_transfer();
        assert_eq!(cmd.to_bytes().as_ref(), hex!("00A4040007F0010203040506"));
        assert_eq!(cmd.command_length(), 12);
    }

    #[test]
    fn size_is_big_endian() {
        let size = SelectCommand::parse_response_raw(&hex!("000001F49000")).unwrap();
        assert_eq!(size, 500);
    }

    #[test]
    fn trailing_bytes_after_size_are_ignored() {
        let size = SelectCommand::parse_response_raw(&hex!("00010000FFFF9000")).unwrap();
        assert_eq!(size, 65536);
    }

    #[test]
    fn short_payload_is_missing_size() {
        let err = SelectCommand::parse_response_raw(&hex!("01F49000")).unwrap_err();
        assert!(matches!(err, Error::MissingSizeField { length: 2 }));
    }

    #[test]
    fn failure_status_is_reported() {
        let err = SelectCommand::parse_response_raw(&hex!("6A82")).unwrap_err();
        assert_eq!(err.status().map(|sw| sw.to_u16()), Some(0x6A82));
    }
}
