//! Name and extension of the transferred file

use std::fmt;

use crate::constants::{AUDIT_SUFFIX, DEFAULT_EXTENSION, DEFAULT_FILE_NAME, TEMP_SUFFIX};

/// Characters that cannot appear in a file name on common filesystems
const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Name and extension under which received bytes are stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIdentity {
    name: String,
    extension: String,
}

impl FileIdentity {
    /// Create an identity, sanitizing both parts
    ///
    /// An empty name after sanitizing falls back to [`DEFAULT_FILE_NAME`].
    pub fn new(name: &str, extension: &str) -> Self {
        let name = sanitize(name);
        Self {
            name: if name.is_empty() {
                DEFAULT_FILE_NAME.to_string()
            } else {
                name
            },
            extension: sanitize(extension),
        }
    }

    /// Parse the GET METADATA payload, `<name>\n<extension>`
    ///
    /// The split happens on the first newline only. A payload without a newline is taken
    /// as a bare name and gets `fallback`'s extension.
    pub fn from_metadata(payload: &[u8], fallback: &Self) -> Self {
        let text = String::from_utf8_lossy(payload);
        match text.split_once('\n') {
            Some((name, extension)) => Self::new(name, extension),
            None => Self::new(&text, fallback.extension()),
        }
    }

    /// Base name without extension
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extension without the leading dot, may be empty
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Final file name, `<name>.<extension>`
    pub fn file_name(&self) -> String {
        if self.extension.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.extension)
        }
    }

    /// File name of the unresolved artifact
    pub fn temp_file_name(&self) -> String {
        format!("{}{TEMP_SUFFIX}", self.file_name())
    }

    /// File name of the per-chunk audit log
    pub fn audit_file_name(&self) -> String {
        format!("{}{AUDIT_SUFFIX}", self.file_name())
    }
}

impl Default for FileIdentity {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_NAME, DEFAULT_EXTENSION)
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Replace characters that would escape the output directory or break the filesystem
fn sanitize(raw: &str) -> String {
    let replaced: String = raw
        .trim()
        .chars()
        .map(|c| {
            if RESERVED.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Leading dots would hide the file or form `..`; trailing dots and spaces are dropped
    // by some filesystems.
    replaced
        .trim_start_matches('.')
        .trim_end_matches(['.', ' '])
        .to_string()
}
