//! Append-only per-chunk audit log
//!
//! Each accepted chunk produces one line with its index and MD5. Write failures are
//! logged and otherwise ignored; the audit log never aborts a transfer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::checksum::FileDigest;

/// Per-chunk audit log
#[derive(Debug)]
pub struct AuditLog {
    writer: Option<BufWriter<File>>,
    path: PathBuf,
}

impl AuditLog {
    /// Open `path` for appending
    ///
    /// If the file cannot be opened the log stays disabled and a warning is emitted.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let writer = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some(BufWriter::new(file)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Audit log unavailable");
                None
            }
        };
        Self { writer, path }
    }

    /// A log that records nothing
    pub fn disabled() -> Self {
        Self {
            writer: None,
            path: PathBuf::new(),
        }
    }

    /// Returns true if entries are being written
    pub const fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// Path of the log file, empty when disabled
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record chunk `index` (starting at 1) received at `offset`
    pub fn record(&mut self, index: usize, offset: usize, chunk: &[u8]) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };

        let digest = FileDigest::compute(chunk);
        let line = format!(
            "chunk={index} offset={offset} len={} md5={digest}",
            chunk.len()
        );
        if let Err(e) = writeln!(writer, "{line}").and_then(|()| writer.flush()) {
            warn!(path = %self.path.display(), error = %e, "Failed to write audit entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_appended_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.bin.chunks.log");

        let mut log = AuditLog::open(&path);
        assert!(log.is_enabled());
        log.record(1, 0, b"abc");
        log.record(2, 3, b"");
        drop(log);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "chunk=1 offset=0 len=3 md5=900150983cd24fb0d6963f7d28e17f72",
                "chunk=2 offset=3 len=0 md5=d41d8cd98f00b204e9800998ecf8427e",
            ]
        );
    }

    #[test]
    fn unopenable_log_is_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = AuditLog::open(dir.path().join("missing").join("log"));
        assert!(!log.is_enabled());
        // Recording on a disabled log is a no-op
        log.record(1, 0, b"abc");
    }
}
