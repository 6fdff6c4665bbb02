//! In-process card that serves a file the way the sending application does
//!
//! [`FileCard`] implements [`CardTransport`], so a [`crate::Receiver`] can run against it
//! without any reader hardware.

use std::path::Path;

use bytes::{BufMut, Bytes, BytesMut};
use tapfile_apdu_core::response::status::{StatusWord, common as status};
use tapfile_apdu_core::{ApduCommand, CardTransport, Command, TransportError};
use tracing::debug;

use crate::checksum::FileDigest;
use crate::constants::{CHUNK_SIZE, ins};

/// Emulated sender holding one file
#[derive(Debug, Clone)]
pub struct FileCard {
    data: Option<Bytes>,
    checksum: Option<Bytes>,
    name: String,
    extension: String,
    chunk_size: usize,
    served: Vec<u8>,
}

impl FileCard {
    /// Serve `data` under `name` and `extension`
    pub fn new(data: impl Into<Bytes>, name: impl Into<String>, extension: impl Into<String>) -> Self {
        let data = data.into();
        let checksum = Bytes::copy_from_slice(FileDigest::compute(&data).as_bytes());
        Self {
            data: Some(data),
            checksum: Some(checksum),
            name: name.into(),
            extension: extension.into(),
            chunk_size: CHUNK_SIZE as usize,
            served: Vec::new(),
        }
    }

    /// A card with no file loaded
    pub fn empty() -> Self {
        Self {
            data: None,
            checksum: None,
            name: String::new(),
            extension: String::new(),
            chunk_size: CHUNK_SIZE as usize,
            served: Vec::new(),
        }
    }

    /// Serve the contents of `path`, named after its stem and extension
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(data, name, extension))
    }

    /// Largest number of bytes answered per READ BINARY
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Report `checksum` instead of the digest of the data
    pub fn with_checksum(mut self, checksum: impl Into<Bytes>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    /// Answer GET CHECKSUM with a failure status
    pub fn without_checksum(mut self) -> Self {
        self.checksum = None;
        self
    }

    /// Instruction bytes of every command received, in order
    pub fn served(&self) -> &[u8] {
        &self.served
    }

    /// Answer one command APDU
    ///
    /// Anything that does not decode as a short APDU is answered with `6F 00`.
    pub fn process(&mut self, apdu: &[u8]) -> Bytes {
        let Ok(command) = Command::from_bytes(apdu) else {
            return status_only(status::NO_PRECISE_DIAGNOSIS);
        };
        self.served.push(command.instruction());

        match command.instruction() {
            ins::SELECT => self.select(),
            ins::READ_BINARY => {
                self.read_binary(u16::from_be_bytes([command.p1(), command.p2()]) as usize)
            }
            ins::GET_CHECKSUM => match &self.checksum {
                Some(checksum) => with_success(checksum),
                None => status_only(status::NO_PRECISE_DIAGNOSIS),
            },
            ins::GET_METADATA => {
                with_success(format!("{}\n{}", self.name, self.extension).as_bytes())
            }
            _ => status_only(status::INVALID_INSTRUCTION),
        }
    }

    fn select(&self) -> Bytes {
        match &self.data {
            Some(data) if !data.is_empty() => with_success(&(data.len() as u32).to_be_bytes()),
            _ => status_only(status::FILE_NOT_FOUND),
        }
    }

    fn read_binary(&self, offset: usize) -> Bytes {
        let Some(data) = &self.data else {
            return status_only(status::COMMAND_NOT_ALLOWED);
        };
        if offset >= data.len() {
            return status_only(status::WRONG_P1P2);
        }

        let end = data.len().min(offset + self.chunk_size);
        debug!(offset, len = end - offset, "Emulator serving chunk");
        with_success(&data[offset..end])
    }
}

impl CardTransport for FileCard {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        Ok(self.process(command))
    }

    fn is_connected(&self) -> bool {
        true
    }
}

fn with_success(payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(payload.len() + 2);
    buf.put_slice(payload);
    buf.put_u16(status::SUCCESS.to_u16());
    buf.freeze()
}

fn status_only(status: StatusWord) -> Bytes {
    Bytes::copy_from_slice(&status.to_u16().to_be_bytes())
}
