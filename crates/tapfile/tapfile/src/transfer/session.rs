use crate::checksum::FileDigest;
use crate::commands::ReadBinaryCommand;
use crate::constants::MAX_OFFSET;
use crate::{Error, Result};

/// Bookkeeping of the READ BINARY loop
///
/// The buffer always holds exactly the first `total_received` bytes of the file, with no
/// gaps, and never more than `file_size` bytes.
#[derive(Debug, Clone)]
pub struct TransferSession {
    file_size: usize,
    chunk_size: u8,
    buffer: Vec<u8>,
    chunks: usize,
}

impl TransferSession {
    /// Start a session for a file of `file_size` bytes
    pub fn new(file_size: usize, chunk_size: u8) -> Self {
        // Only the addressable prefix can ever arrive
        let capacity = file_size.min(MAX_OFFSET + 1 + chunk_size as usize);
        Self {
            file_size,
            chunk_size,
            buffer: Vec::with_capacity(capacity),
            chunks: 0,
        }
    }

    /// Announced size
    pub const fn file_size(&self) -> usize {
        self.file_size
    }

    /// Bytes accepted so far
    pub fn total_received(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes still missing
    pub fn remaining(&self) -> usize {
        self.file_size - self.buffer.len()
    }

    /// Returns true once every announced byte has arrived
    pub fn is_complete(&self) -> bool {
        self.buffer.len() == self.file_size
    }

    /// Number of chunks accepted
    pub const fn chunks(&self) -> usize {
        self.chunks
    }

    /// READ BINARY for the next chunk
    pub fn next_command(&self) -> Result<ReadBinaryCommand> {
        ReadBinaryCommand::next_chunk(self.total_received(), self.file_size, self.chunk_size)
    }

    /// Accept a chunk payload
    ///
    /// Only `min(payload.len(), remaining)` bytes are kept; excess bytes are dropped. An
    /// empty payload fails with [`Error::ZeroProgress`]. Returns the accepted slice and
    /// its 1-based chunk index.
    pub fn accept<'a>(&mut self, payload: &'a [u8]) -> Result<(usize, &'a [u8])> {
        if payload.is_empty() {
            return Err(Error::ZeroProgress {
                offset: self.total_received(),
            });
        }

        let accepted = &payload[..payload.len().min(self.remaining())];
        self.buffer.extend_from_slice(accepted);
        self.chunks += 1;
        Ok((self.chunks, accepted))
    }

    /// Bytes received so far
    pub fn received(&self) -> &[u8] {
        &self.buffer
    }

    /// MD5 of the bytes received so far
    pub fn digest(&self) -> FileDigest {
        FileDigest::compute(&self.buffer)
    }
}
