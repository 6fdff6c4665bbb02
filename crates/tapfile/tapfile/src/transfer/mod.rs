//! Reader-side transfer state machine
//!
//! A transfer walks `Idle → Selected → MetadataKnown → Receiving → Verifying` and ends
//! in [`TransferState::Done`] or [`TransferState::Failed`]. Failures never discard
//! received bytes; they are recorded in the [`TransferReport`] together with the step
//! that produced them.

mod progress;
mod receiver;
mod session;

pub use progress::{NoProgress, Progress};
pub use receiver::Receiver;
pub use session::TransferSession;

use std::path::Path;

use derive_more::Display;
use tapfile_apdu_core::StatusWord;

use crate::checksum::ChecksumOutcome;
use crate::sink::Artifact;
use crate::{Error, FileIdentity};

/// Phase of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TransferState {
    /// Nothing sent yet
    Idle,
    /// SELECT succeeded and the file size is known
    Selected,
    /// Name and extension are fixed, from the sender or the defaults
    MetadataKnown,
    /// READ BINARY loop in progress
    Receiving,
    /// Comparing digests
    Verifying,
    /// Ended without a failure
    Done,
    /// Ended with a recorded failure
    Failed,
}

/// Exchange in which a failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Step {
    /// SELECT
    #[display("SELECT")]
    Select,
    /// READ BINARY
    #[display("READ BINARY")]
    Read,
    /// Writing the temporary artifact
    #[display("WRITE")]
    Write,
}

/// Why a transfer stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FailureReason {
    /// SELECT failed at the transport or with a non-success status
    #[display("SELECT rejected")]
    SelectRejected,
    /// SELECT succeeded but carried fewer than 4 payload bytes
    #[display("file size missing from SELECT response")]
    MissingSizeField,
    /// A READ BINARY exchange failed at the transport
    #[display("transport error while reading")]
    ReadTransportError,
    /// A response was shorter than 2 bytes
    #[display("malformed response")]
    MalformedResponse,
    /// A READ BINARY was answered with a non-success status
    #[display("read rejected by card")]
    ReadRejected,
    /// A READ BINARY succeeded without returning data
    #[display("card made no progress")]
    ZeroProgress,
    /// The next offset does not fit in P1/P2
    #[display("offset beyond the READ BINARY address space")]
    OffsetOverflow,
    /// The temporary artifact could not be created or written
    #[display("local write failed")]
    SinkError,
}

impl FailureReason {
    /// Classify an error raised during the READ BINARY loop
    pub const fn for_read(error: &Error) -> Self {
        match error {
            Error::Transport(_) => Self::ReadTransportError,
            Error::MalformedResponse { .. } => Self::MalformedResponse,
            Error::ZeroProgress { .. } => Self::ZeroProgress,
            Error::OffsetOverflow { .. } => Self::OffsetOverflow,
            Error::Io(_) => Self::SinkError,
            _ => Self::ReadRejected,
        }
    }

    /// Classify an error raised by SELECT
    pub const fn for_select(error: &Error) -> Self {
        match error {
            Error::MissingSizeField { .. } => Self::MissingSizeField,
            Error::MalformedResponse { .. } => Self::MalformedResponse,
            _ => Self::SelectRejected,
        }
    }
}

/// A recorded failure with enough context to diagnose it
#[derive(Debug)]
pub struct Failure {
    /// Exchange that failed
    pub step: Step,
    /// Classification
    pub reason: FailureReason,
    /// Offset of the failing read, 0 for SELECT
    pub offset: usize,
    /// Bytes received before the failure
    pub received: usize,
    /// Bytes announced by the sender
    pub expected: usize,
    /// Underlying error
    pub error: Error,
}

impl Failure {
    /// Status word reported by the card, if any
    pub const fn status(&self) -> Option<StatusWord> {
        self.error.status()
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {} ({})", self.step, self.reason, self.error)?;
        if self.step != Step::Select {
            write!(
                f,
                " at offset {}, received {} of {} bytes",
                self.offset, self.received, self.expected
            )?;
        }
        Ok(())
    }
}

/// Everything known about a finished transfer
#[derive(Debug)]
pub struct TransferReport {
    /// Final state, `Done` or `Failed`
    pub state: TransferState,
    /// Size announced by SELECT, 0 if SELECT failed
    pub file_size: usize,
    /// Bytes received and written
    pub total_received: usize,
    /// Number of chunks accepted
    pub chunks: usize,
    /// Name and extension the artifact was stored under
    pub identity: FileIdentity,
    /// Whether the identity came from the sender
    pub metadata_received: bool,
    /// First failure, if any
    pub failure: Option<Failure>,
    /// Digest comparison, absent when no bytes were expected or SELECT failed
    pub checksum: Option<ChecksumOutcome>,
    /// Whether the written artifact hashes to the same digest as the received bytes
    pub written_digest_matches: Option<bool>,
    /// Closed temporary artifact, absent when nothing was stored
    pub artifact: Option<Artifact>,
    /// Path of the audit log, absent when disabled
    pub audit_path: Option<std::path::PathBuf>,
}

impl TransferReport {
    pub(crate) fn new(identity: FileIdentity) -> Self {
        Self {
            state: TransferState::Idle,
            file_size: 0,
            total_received: 0,
            chunks: 0,
            identity,
            metadata_received: false,
            failure: None,
            checksum: None,
            written_digest_matches: None,
            artifact: None,
            audit_path: None,
        }
    }

    /// Returns true if SELECT succeeded and every announced byte arrived
    pub fn transfer_complete(&self) -> bool {
        let selected = !matches!(&self.failure, Some(f) if f.step == Step::Select);
        selected && self.total_received == self.file_size
    }

    /// Returns true if the sender's digest matched the received bytes
    pub fn checksum_verified(&self) -> bool {
        self.checksum
            .as_ref()
            .is_some_and(ChecksumOutcome::is_verified)
    }

    /// Path of the temporary artifact, if one was written
    pub fn temp_path(&self) -> Option<&Path> {
        self.artifact.as_ref().map(Artifact::temp_path)
    }

    /// Percentage of the announced size that arrived
    pub fn percent_received(&self) -> f64 {
        if self.file_size == 0 {
            100.0
        } else {
            self.total_received as f64 * 100.0 / self.file_size as f64
        }
    }
}
