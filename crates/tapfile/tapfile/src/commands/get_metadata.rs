use bytes::Bytes;
use tapfile_apdu_core::{ApduCommand, ExpectedLength, Response};

use crate::constants::{CLA_ISO7816, ins};
use crate::{Error, Result};

/// GET METADATA, answered with `<name>\n<extension>`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetMetadataCommand;

impl ApduCommand for GetMetadataCommand {
    /// Raw metadata payload, see [`crate::FileIdentity::from_metadata`]
    type Success = Bytes;
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO7816
    }

    fn instruction(&self) -> u8 {
        ins::GET_METADATA
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
        super::success_payload(response)
    }
}
