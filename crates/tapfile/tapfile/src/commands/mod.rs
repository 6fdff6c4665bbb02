//! Commands of the file transfer application
//!
//! Each command implements [`ApduCommand`] so that encoding and response parsing live
//! next to each other. The free functions below are thin wrappers for callers that only
//! need raw bytes.

use bytes::Bytes;
use tapfile_apdu_core::{ApduCommand, Response, StatusWord};

use crate::Result;

pub mod get_checksum;
pub use get_checksum::*;
pub mod get_metadata;
pub use get_metadata::*;
pub mod read_binary;
pub use read_binary::*;
pub mod select;
pub use select::*;

/// Encode a SELECT by name for `aid`
pub fn build_select(aid: &[u8]) -> Bytes {
    SelectCommand::with_aid(Bytes::copy_from_slice(aid)).to_bytes()
}

/// Encode a READ BINARY for `expected_len` bytes at `offset`
pub fn build_read_binary(offset: u16, expected_len: u8) -> Bytes {
    ReadBinaryCommand::new(offset, expected_len).to_bytes()
}

/// Encode a GET METADATA request
pub fn build_metadata_request() -> Bytes {
    GetMetadataCommand.to_bytes()
}

/// Encode a GET CHECKSUM request
pub fn build_checksum_request() -> Bytes {
    GetChecksumCommand.to_bytes()
}

/// Split a raw response into its payload and status word
///
/// Fails with [`Error::MalformedResponse`](crate::Error::MalformedResponse) when fewer than 2 bytes are present. The
/// status word is returned as-is, success or not.
pub fn parse_response(raw: &[u8]) -> Result<(Bytes, StatusWord)> {
    Ok(Response::from_bytes(raw)?.into_parts())
}

/// Take the payload of a response, turning any non-success status into [`Error::Status`](crate::Error::Status)
pub(crate) fn success_payload(response: Response) -> Result<Bytes> {
    Ok(response.into_payload()?)
}
