//! Temporary-then-final storage of received bytes

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::FileIdentity;

/// Sequential writer for the temporary artifact `<name>.<ext>.temp`
///
/// Bytes are appended in arrival order. The file is flushed and synced by [`Self::close`];
/// dropping the sink without closing still releases the handle.
#[derive(Debug)]
pub struct FileSink {
    writer: BufWriter<File>,
    temp_path: PathBuf,
    final_path: PathBuf,
    written: usize,
}

impl FileSink {
    /// Create (or truncate) the temporary artifact for `identity` inside `dir`
    pub fn create(dir: &Path, identity: &FileIdentity) -> io::Result<Self> {
        let temp_path = dir.join(identity.temp_file_name());
        let final_path = dir.join(identity.file_name());
        let file = File::create(&temp_path)?;
        debug!(path = %temp_path.display(), "Opened temporary artifact");

        Ok(Self {
            writer: BufWriter::new(file),
            temp_path,
            final_path,
            written: 0,
        })
    }

    /// Append a chunk
    pub fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.writer.write_all(chunk)?;
        self.written += chunk.len();
        Ok(())
    }

    /// Number of bytes written so far
    pub const fn written(&self) -> usize {
        self.written
    }

    /// Path of the temporary artifact
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flush, sync to disk and close the file
    pub fn close(self) -> io::Result<Artifact> {
        let Self {
            writer,
            temp_path,
            final_path,
            written,
        } = self;

        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        drop(file);

        Ok(Artifact {
            temp_path,
            final_path,
            len: written,
        })
    }
}

/// A closed temporary artifact awaiting resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    temp_path: PathBuf,
    final_path: PathBuf,
    len: usize,
}

impl Artifact {
    /// Path of the temporary file
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Path the file gets once promoted
    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Number of bytes in the artifact
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no bytes were written
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if something already occupies the final name
    pub fn final_name_taken(&self) -> io::Result<bool> {
        self.final_path.try_exists()
    }

    /// Rename the temporary file to its final name
    ///
    /// Fails with [`io::ErrorKind::AlreadyExists`] rather than replacing an existing file.
    pub fn promote(&self) -> io::Result<PathBuf> {
        if self.final_name_taken()? {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", self.final_path.display()),
            ));
        }
        fs::rename(&self.temp_path, &self.final_path)?;
        info!(path = %self.final_path.display(), "Promoted artifact");
        Ok(self.final_path.clone())
    }
}
