//! Deciding what happens to the temporary artifact once a transfer ends
//!
//! | transfer | checksum | outcome |
//! |---|---|---|
//! | complete | verified | promoted |
//! | complete | mismatch or unavailable | promoted only if confirmed |
//! | incomplete | any | kept as `.temp` |
//! | complete, final name taken | any | kept as `.temp` |
//!
//! Temporary artifacts are never deleted here; declining keeps them for inspection.

use std::fmt;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::Result;
use crate::transfer::TransferReport;

/// Callback asked whether an unverified file should be kept
pub type ConfirmationFn = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Why a temporary artifact was left in place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepReason {
    /// Not every announced byte arrived
    Incomplete,
    /// The checksum did not verify and the user declined
    Declined,
    /// A file with the final name already exists
    NameTaken,
}

/// What was done with a finished transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Renamed to its final name
    Promoted(PathBuf),
    /// Left under its temporary name
    KeptTemporary {
        /// Path of the temporary artifact
        path: PathBuf,
        /// Why it was not promoted
        reason: KeepReason,
    },
    /// No artifact was stored
    NothingStored,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Promoted(path) => write!(f, "saved as {}", path.display()),
            Self::KeptTemporary { path, reason } => {
                let why = match reason {
                    KeepReason::Incomplete => "transfer incomplete",
                    KeepReason::Declined => "not confirmed",
                    KeepReason::NameTaken => "final name already in use",
                };
                write!(f, "kept as {} ({why})", path.display())
            }
            Self::NothingStored => f.write_str("nothing stored"),
        }
    }
}

/// Applies the keep-or-promote policy to a [`TransferReport`]
pub struct Resolver {
    confirmation: Option<ConfirmationFn>,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("confirmation", &self.confirmation.is_some())
            .finish()
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// A resolver without a confirmation callback; unverified files stay temporary
    pub const fn new() -> Self {
        Self { confirmation: None }
    }

    /// A resolver that asks `confirmation` before keeping an unverified file
    pub fn with_confirmation(confirmation: ConfirmationFn) -> Self {
        Self {
            confirmation: Some(confirmation),
        }
    }

    /// Promote, keep or ignore the artifact of `report`
    pub fn resolve(&self, report: &TransferReport) -> Result<Resolution> {
        let Some(artifact) = &report.artifact else {
            return Ok(Resolution::NothingStored);
        };

        if !report.transfer_complete() {
            warn!(
                received = report.total_received,
                expected = report.file_size,
                path = %artifact.temp_path().display(),
                "Transfer incomplete, keeping temporary file"
            );
            return Ok(Resolution::KeptTemporary {
                path: artifact.temp_path().to_path_buf(),
                reason: KeepReason::Incomplete,
            });
        }

        if artifact.final_name_taken()? {
            warn!(
                path = %artifact.final_path().display(),
                "Final name already in use, keeping temporary file"
            );
            return Ok(Resolution::KeptTemporary {
                path: artifact.temp_path().to_path_buf(),
                reason: KeepReason::NameTaken,
            });
        }

        if report.checksum_verified() || self.confirm(&Self::prompt(report)) {
            if !report.checksum_verified() {
                warn!(file = %report.identity, "Keeping file despite failed verification");
            }
            let path = artifact.promote()?;
            return Ok(Resolution::Promoted(path));
        }

        info!(path = %artifact.temp_path().display(), "Keeping temporary file");
        Ok(Resolution::KeptTemporary {
            path: artifact.temp_path().to_path_buf(),
            reason: KeepReason::Declined,
        })
    }

    fn confirm(&self, message: &str) -> bool {
        self.confirmation
            .as_ref()
            .is_some_and(|confirmation| confirmation(message))
    }

    /// Message shown to the user before keeping an unverified file
    pub fn prompt(report: &TransferReport) -> String {
        let mut message = match &report.checksum {
            Some(outcome) => format!("{} received, but {outcome}.", report.identity),
            None => format!("{} received without verification.", report.identity),
        };
        if let Some(outcome) = &report.checksum {
            let causes = outcome.plausible_causes();
            if !causes.is_empty() {
                message.push_str(" Possible causes: ");
                message.push_str(&causes.join("; "));
                message.push('.');
            }
        }
        message.push_str(" Keep the file?");
        message
    }
}
