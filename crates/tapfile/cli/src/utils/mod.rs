//! Utility functions and types for the tapfile CLI

pub mod display;
pub mod prompt;
pub mod reader;

use std::path::PathBuf;

use clap::Args;

/// Options shared by every command that runs a transfer
#[derive(Args, Debug, Clone, Default)]
pub struct TransferArgs {
    /// Directory receiving the file (defaults to the current directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Pause between reads, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Do not write the per-chunk audit log
    #[arg(long)]
    pub no_audit: bool,

    /// Keep complete but unverified files without asking
    #[arg(short, long, conflicts_with = "no")]
    pub yes: bool,

    /// Never keep unverified files; they stay as .temp
    #[arg(short, long)]
    pub no: bool,
}

/// How unverified complete transfers are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Prompt on the terminal
    Ask,
    /// Keep without asking
    Keep,
    /// Leave as temporary
    Decline,
}

impl TransferArgs {
    /// Decision requested on the command line
    pub const fn decision(&self) -> Decision {
        if self.yes {
            Decision::Keep
        } else if self.no {
            Decision::Decline
        } else {
            Decision::Ask
        }
    }
}
