//! Core traits and types for APDU (Application Protocol Data Unit) operations
//!
//! This crate provides the foundational types and traits for working with smart card
//! APDU commands and responses according to ISO/IEC 7816-4.
//!
//! ## Overview
//!
//! APDU (Application Protocol Data Unit) is the communication format used by smart cards
//! and NFC host card emulation. This crate provides abstractions for:
//!
//! - Creating and parsing short APDU commands and responses
//! - Communicating with cards through a synchronous request/response transport
//! - Error handling and status word interpretation
//!
//! Everything here is protocol-generic; application specific commands are built on top of
//! [`ApduCommand`] by downstream crates.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

// Main modules
pub mod command;
pub mod response;
pub mod transport;

// Core error types
mod error;
pub use error::{Error, Result};

// Re-exports for common types
pub use command::{ApduCommand, Command, ExpectedLength};
pub use response::status::StatusWord;
pub use response::{Response, utils};
pub use transport::{CardTransport, TransportError};

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        Bytes, BytesMut, Command, Error, Response, Result,
        command::{ApduCommand, ExpectedLength},
        response::error::{ResponseError, StatusError},
        response::status::{StatusWord, common as status},
        transport::{CardTransport, TransportError},
    };
}
