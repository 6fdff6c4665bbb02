//! PC/SC transport implementation for APDU operations
//!
//! This crate provides an implementation of the `CardTransport` trait from
//! `tapfile-apdu-core` using the PC/SC API. An NFC reader talking to a phone in host
//! card emulation mode shows up as an ordinary PC/SC reader with a card present.
//!
//! # Examples
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use tapfile_apdu_core::prelude::*;
//! use tapfile_apdu_transport_pcsc::{ConnectStrategy, PcscConfig, PcscDeviceManager};
//!
//! let manager = PcscDeviceManager::new()?;
//! let mut transport = manager.connect_strategy(ConnectStrategy::AnyCard, PcscConfig::default())?;
//!
//! let select = Command::new_with_data(0x00, 0xA4, 0x04, 0x00, vec![0xF0, 0x01, 0x02]);
//! let response = Response::from_bytes(&transport.transmit_raw(&select.to_bytes())?)?;
//! println!("SELECT answered {}", response.status());
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(missing_docs)]

mod config;
mod error;
mod manager;
mod reader;
mod transport;

pub use config::{ConnectStrategy, PcscConfig, ShareMode};
pub use error::PcscError;
pub use manager::PcscDeviceManager;
pub use reader::PcscReader;
pub use transport::{PcscTransport, RESPONSE_BUFFER_SIZE};

// Re-export some pcsc types for convenience
pub use pcsc::{Protocol, Protocols};
