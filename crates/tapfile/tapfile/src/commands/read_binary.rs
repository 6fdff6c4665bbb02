use bytes::Bytes;
use tapfile_apdu_core::{ApduCommand, ExpectedLength, Response};

use crate::constants::{CLA_ISO7816, MAX_OFFSET, ins};
use crate::{Error, Result};

/// READ BINARY of up to `expected_len` bytes at `offset`
///
/// The offset travels big-endian in P1/P2, which limits it to 16 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadBinaryCommand {
    offset: u16,
    expected_len: u8,
}

impl ReadBinaryCommand {
    /// Create a READ BINARY command
    pub const fn new(offset: u16, expected_len: u8) -> Self {
        Self {
            offset,
            expected_len,
        }
    }

    /// Next read for a transfer that has received `received` of `file_size` bytes
    ///
    /// Requests `min(chunk_size, remaining)` bytes. Fails with [`Error::OffsetOverflow`]
    /// when `received` cannot be expressed in P1/P2.
    pub fn next_chunk(received: usize, file_size: usize, chunk_size: u8) -> Result<Self> {
        if received > MAX_OFFSET {
            return Err(Error::OffsetOverflow { offset: received });
        }
        let remaining = file_size.saturating_sub(received);
        let expected_len = remaining.min(chunk_size as usize) as u8;
        Ok(Self::new(received as u16, expected_len))
    }

    /// Offset of the read
    pub const fn offset(&self) -> u16 {
        self.offset
    }

    /// Number of bytes requested
    pub const fn expected_len(&self) -> u8 {
        self.expected_len
    }
}

impl ApduCommand for ReadBinaryCommand {
    /// Chunk payload, possibly shorter or longer than requested
    type Success = Bytes;
    type Error = Error;

    fn class(&self) -> u8 {
        CLA_ISO7816
    }

    fn instruction(&self) -> u8 {
        ins::READ_BINARY
    }

    fn p1(&self) -> u8 {
        (self.offset >> 8) as u8
    }

    fn p2(&self) -> u8 {
        (self.offset & 0xFF) as u8
    }

    fn data(&self) -> Option<&[u8]> {
        None
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        Some(self.expected_len)
    }

    fn parse_response(response: Response) -> Result<Bytes> {
        super::success_payload(response)
    }
}
