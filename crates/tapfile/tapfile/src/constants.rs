//! Protocol constants shared by the reader and the card emulator

use std::time::Duration;

/// Class byte for every command of the file transfer application
pub const CLA_ISO7816: u8 = 0x00;

/// Instruction codes
pub mod ins {
    /// SELECT (application select by name)
    pub const SELECT: u8 = 0xA4;
    /// READ BINARY (offset addressed read)
    pub const READ_BINARY: u8 = 0xB0;
    /// GET CHECKSUM (vendor defined)
    pub const GET_CHECKSUM: u8 = 0xB1;
    /// GET METADATA (vendor defined)
    pub const GET_METADATA: u8 = 0xB2;
}

/// SELECT P1: select by DF name
pub const SELECT_BY_NAME: u8 = 0x04;

/// SELECT P2: first or only occurrence
pub const SELECT_FIRST_OCCURRENCE: u8 = 0x00;

/// AID registered by the sending application
pub const FILE_TRANSFER_AID: [u8; 7] = [0xF0, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06];

/// Largest chunk requested per READ BINARY, kept under common APDU payload ceilings
pub const CHUNK_SIZE: u8 = 230;

/// Pause between two READ BINARY exchanges
pub const INTER_CHUNK_DELAY: Duration = Duration::from_millis(50);

/// Length of the big-endian file size field in the SELECT response
pub const SIZE_FIELD_LEN: usize = 4;

/// Highest offset a READ BINARY can address through P1/P2
pub const MAX_OFFSET: usize = u16::MAX as usize;

/// Name used when the sender does not provide metadata
pub const DEFAULT_FILE_NAME: &str = "received_file";

/// Extension used when the sender does not provide metadata
pub const DEFAULT_EXTENSION: &str = "bin";

/// Suffix of the artifact while the transfer is unresolved
pub const TEMP_SUFFIX: &str = ".temp";

/// Suffix of the per-chunk audit log written next to the artifact
pub const AUDIT_SUFFIX: &str = ".chunks.log";
