//! APDU command definitions and traits
//!
//! This module provides types and traits for working with short APDU commands
//! according to ISO/IEC 7816-4.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::response::error::ResponseError;
use crate::{Error, Response};

/// Expected length type for APDU commands
///
/// Only short APDUs are supported, so Le is a single byte where `0` asks the card for
/// everything it has (up to 256 bytes).
pub type ExpectedLength = u8;

/// Maximum length of the command data field in a short APDU
pub const MAX_DATA_LENGTH: usize = 255;

/// Core trait for APDU commands
pub trait ApduCommand {
    /// Success response type
    type Success;

    /// Error response type
    type Error: From<ResponseError> + fmt::Debug;

    /// Command class (CLA)
    fn class(&self) -> u8;

    /// Instruction code (INS)
    fn instruction(&self) -> u8;

    /// First parameter (P1)
    fn p1(&self) -> u8;

    /// Second parameter (P2)
    fn p2(&self) -> u8;

    /// Command payload data (optional)
    fn data(&self) -> Option<&[u8]>;

    /// Expected response length (optional)
    fn expected_length(&self) -> Option<ExpectedLength>;

    /// Check that the command can be encoded as a short APDU
    fn validate(&self) -> Result<(), Error> {
        match self.data() {
            Some(data) if data.len() > MAX_DATA_LENGTH => {
                Err(Error::InvalidCommandLength(data.len()))
            }
            _ => Ok(()),
        }
    }

    /// Convert to raw APDU bytes
    ///
    /// Data longer than [`MAX_DATA_LENGTH`] is truncated; call [`Self::validate`] first
    /// for untrusted input.
    fn to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::with_capacity(self.command_length());

        // Header: CLA, INS, P1, P2
        buffer.put_u8(self.class());
        buffer.put_u8(self.instruction());
        buffer.put_u8(self.p1());
        buffer.put_u8(self.p2());

        // Lc and data
        if let Some(data) = self.data() {
            let data = &data[..data.len().min(MAX_DATA_LENGTH)];
            buffer.put_u8(data.len() as u8);
            buffer.put_slice(data);
        }

        if let Some(le) = self.expected_length() {
            buffer.put_u8(le);
        }

        buffer.freeze()
    }

    /// Calculate length of serialized command
    fn command_length(&self) -> usize {
        // Header (CLA, INS, P1, P2) is always 4 bytes
        let mut length = 4;

        if let Some(data) = self.data() {
            length += 1 + data.len().min(MAX_DATA_LENGTH);
        }

        if self.expected_length().is_some() {
            length += 1;
        }

        length
    }

    /// Convert to a generic Command
    fn to_command(&self) -> Command {
        Command {
            cla: self.class(),
            ins: self.instruction(),
            p1: self.p1(),
            p2: self.p2(),
            data: self.data().map(Bytes::copy_from_slice),
            le: self.expected_length(),
        }
    }

    /// Parse response into the command's response type
    fn parse_response(response: Response) -> Result<Self::Success, Self::Error>;

    /// Parse raw bytes into the command's response type
    fn parse_response_raw(bytes: &[u8]) -> Result<Self::Success, Self::Error> {
        let response = Response::from_bytes(bytes)?;
        Self::parse_response(response)
    }
}

/// Generic APDU command structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data (optional)
    pub data: Option<Bytes>,
    /// Expected length (optional)
    pub le: Option<ExpectedLength>,
}

impl Command {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: None,
        }
    }

    /// Create a new command with expected response length (Le)
    pub const fn new_with_le(cla: u8, ins: u8, p1: u8, p2: u8, le: ExpectedLength) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: Some(le),
        }
    }

    /// Create a new command with data payload
    pub fn new_with_data<T: Into<Bytes>>(cla: u8, ins: u8, p1: u8, p2: u8, data: T) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Some(data.into()),
            le: None,
        }
    }

    /// Set the data field
    pub fn with_data<T: Into<Bytes>>(mut self, data: T) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the expected length field
    pub const fn with_le(mut self, le: ExpectedLength) -> Self {
        self.le = Some(le);
        self
    }

    /// Parse a command from raw bytes
    ///
    /// Used on the card side to decode what a reader sent.
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        if data.len() < 4 {
            return Err(Error::InvalidCommandLength(data.len()));
        }

        let mut command = Self::new(data[0], data[1], data[2], data[3]);

        if data.len() == 5 {
            // Case 2: only Le present
            command.le = Some(data[4]);
        } else if data.len() > 5 {
            let lc = data[4] as usize;
            let body_end = 5 + lc;

            if lc == 0 || data.len() < body_end || data.len() > body_end + 1 {
                return Err(Error::InvalidCommandLength(data.len()));
            }

            command.data = Some(Bytes::copy_from_slice(&data[5..body_end]));
            if data.len() == body_end + 1 {
                command.le = Some(data[body_end]);
            }
        }

        Ok(command)
    }
}

impl ApduCommand for Command {
    type Success = Response;
    type Error = Error;

    fn class(&self) -> u8 {
        self.cla
    }

    fn instruction(&self) -> u8 {
        self.ins
    }

    fn p1(&self) -> u8 {
        self.p1
    }

    fn p2(&self) -> u8 {
        self.p2
    }

    fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        self.le
    }

    fn parse_response(response: Response) -> Result<Self::Success, Self::Error> {
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_command_serialization() {
        let cmd = Command::new_with_data(0x00, 0xA4, 0x04, 0x00, hex!("F0010203040506").to_vec());
        assert_eq!(cmd.to_bytes().as_ref(), hex!("00A4040007F0010203040506"));

        let cmd = Command::new_with_le(0x00, 0xB0, 0x01, 0x02, 0xE6);
        assert_eq!(cmd.to_bytes().as_ref(), hex!("00B00102E6"));
    }

    #[test]
    fn test_command_length() {
        let cmd1 = Command::new(0x00, 0xB0, 0x00, 0x00);
        assert_eq!(cmd1.command_length(), 4);

        let cmd2 = Command::new_with_le(0x00, 0xB0, 0x00, 0x00, 0xFF);
        assert_eq!(cmd2.command_length(), 5);

        let cmd3 = Command::new_with_data(0x00, 0xD6, 0x00, 0x00, vec![1, 2, 3]);
        assert_eq!(cmd3.command_length(), 8);

        let cmd4 = cmd3.with_le(0x00);
        assert_eq!(cmd4.command_length(), 9);
        assert_eq!(cmd4.to_bytes().len(), 9);
    }

    #[test]
    fn test_validate_rejects_oversized_data() {
        let cmd = Command::new_with_data(0x00, 0xD6, 0x00, 0x00, vec![0u8; 256]);
        assert!(matches!(cmd.validate(), Err(Error::InvalidCommandLength(256))));

        let cmd = Command::new_with_data(0x00, 0xD6, 0x00, 0x00, vec![0u8; 255]);
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_command_from_bytes() {
        let cmd = Command::from_bytes(&hex!("00A40400")).unwrap();
        assert_eq!(cmd, Command::new(0x00, 0xA4, 0x04, 0x00));

        let cmd = Command::from_bytes(&hex!("00A4040003010203")).unwrap();
        assert_eq!(cmd.data.as_deref(), Some(&[0x01, 0x02, 0x03][..]));
        assert!(cmd.le.is_none());

        let cmd = Command::from_bytes(&hex!("00A4040003010203FF")).unwrap();
        assert_eq!(cmd.data.as_deref(), Some(&[0x01, 0x02, 0x03][..]));
        assert_eq!(cmd.le, Some(0xFF));

        let cmd = Command::from_bytes(&hex!("00B0001400")).unwrap();
        assert_eq!((cmd.p1, cmd.p2), (0x00, 0x14));
        assert_eq!(cmd.le, Some(0x00));

        assert!(Command::from_bytes(&hex!("00B000")).is_err());
        assert!(Command::from_bytes(&hex!("00A404000501")).is_err());
    }

    #[test]
    fn test_from_bytes_roundtrips_to_bytes() {
        let cmd = Command::new_with_data(0x00, 0xA4, 0x04, 0x00, vec![0xF0, 0x01]).with_le(0);
        assert_eq!(Command::from_bytes(&cmd.to_bytes()).unwrap(), cmd);
    }
}
