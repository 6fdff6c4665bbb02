use bytes::Bytes;
use tapfile_apdu_core::{ApduCommand, ExpectedLength, Response};

use crate::constants::{CLA_ISO7816, ins};
use crate::{Error, Result};

/// GET CHECKSUM, answered with the sender's raw MD5 digest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetChecksumCommand;

impl ApduCommand for GetChecksumCommand {
    /// Raw digest bytes as sent by the card
    type Success = Bytes;
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO7816
    }

    fn instruction(&self) -> u8 {
        ins::GET_CHECKSUM
    }

    fn p1(&self) -> u8 {
        0x00
    }

    fn p2(&self) -> u8 {
        0x00
    }

    fn data(&self) -> Option<&[u8]> {
        None
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        Some(0x00)
    }

    fn parse_response(response: Response) -> Result<Bytes> {
        let digest = super::success_payload(response)?;
        if digest.is_empty() {
            return Err(Error::ChecksumUnavailable(
                "sender returned an empty digest".to_string(),
            ));
        }
        Ok(digest)
    }
}
