//! Receive a file from a contactless sender over ISO 7816-4 APDUs
//!
//! The sender (typically a phone using host card emulation) exposes one file behind a
//! fixed AID. The reader selects it, learns its size, asks for its name, pulls it in
//! chunks with READ BINARY and finally compares the sender's MD5 with its own.
//!
//! ```no_run
//! use tapfile::{Receiver, Resolver, TransferConfig, emulator::FileCard};
//!
//! let card = FileCard::new(b"hello".to_vec(), "greeting", "txt");
//! let mut receiver = Receiver::new(card, TransferConfig::new().with_output_dir("/tmp"))?;
//! let report = receiver.run();
//! let resolution = Resolver::new().resolve(&report)?;
//! println!("{resolution}");
//! # Ok::<(), tapfile::Error>(())
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

pub mod audit;
pub mod checksum;
pub mod commands;
mod config;
pub mod constants;
pub mod emulator;
mod error;
mod identity;
pub mod resolution;
pub mod sink;
pub mod transfer;

pub use checksum::{ChecksumOutcome, FileDigest};
pub use config::TransferConfig;
pub use error::{Error, Result};
pub use identity::FileIdentity;
pub use resolution::{ConfirmationFn, KeepReason, Resolution, Resolver};
pub use transfer::{
    Failure, FailureReason, Progress, Receiver, Step, TransferReport, TransferState,
};
