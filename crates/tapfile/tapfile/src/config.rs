//! Transfer configuration

use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;

use crate::constants::{CHUNK_SIZE, FILE_TRANSFER_AID, INTER_CHUNK_DELAY};
use crate::{Error, FileIdentity, Result};

/// Options of a single receive run
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// AID sent with SELECT
    pub aid: Bytes,

    /// Largest number of bytes requested per READ BINARY
    pub chunk_size: u8,

    /// Pause between two reads
    pub inter_chunk_delay: Duration,

    /// Directory receiving the artifact and the audit log
    pub output_dir: PathBuf,

    /// Identity used when the sender provides no metadata
    pub default_identity: FileIdentity,

    /// Write a per-chunk audit log next to the artifact
    pub audit_log: bool,

    /// Re-hash the written artifact and compare it with the in-memory digest
    pub verify_written: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            aid: Bytes::from_static(&FILE_TRANSFER_AID),
            chunk_size: CHUNK_SIZE,
            inter_chunk_delay: INTER_CHUNK_DELAY,
            output_dir: PathBuf::from("."),
            default_identity: FileIdentity::default(),
            audit_log: true,
            verify_written: true,
        }
    }
}

impl TransferConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the AID to select
    pub fn with_aid(mut self, aid: impl Into<Bytes>) -> Self {
        self.aid = aid.into();
        self
    }

    /// Set the chunk size
    pub const fn with_chunk_size(mut self, chunk_size: u8) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the pause between reads
    pub const fn with_inter_chunk_delay(mut self, delay: Duration) -> Self {
        self.inter_chunk_delay = delay;
        self
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the fallback identity
    pub fn with_default_identity(mut self, identity: FileIdentity) -> Self {
        self.default_identity = identity;
        self
    }

    /// Enable or disable the audit log
    pub const fn with_audit_log(mut self, enabled: bool) -> Self {
        self.audit_log = enabled;
        self
    }

    /// Enable or disable re-hashing of the written artifact
    pub const fn with_verify_written(mut self, enabled: bool) -> Self {
        self.verify_written = enabled;
        self
    }

    /// Check that the configuration can drive a transfer
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk size must be at least 1"));
        }
        if self.aid.is_empty() || self.aid.len() > 16 {
            return Err(Error::Config("AID must be between 1 and 16 bytes"));
        }
        Ok(())
    }
}
