use std::path::Path;

use eyre::WrapErr;
use tapfile::checksum::DIGEST_LEN;
use tapfile::emulator::FileCard;

use super::{TransferArgs, run_transfer, transfer_config};
use crate::config::Settings;
use crate::utils::display;

/// Fault injection for the emulated sender
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulateOptions {
    /// Bytes answered per READ BINARY
    pub card_chunk_size: Option<usize>,
    /// Report a digest that cannot match
    pub corrupt_checksum: bool,
    /// Refuse GET CHECKSUM
    pub no_checksum: bool,
}

/// Receive `file` from an in-process emulated sender
pub fn simulate_command(
    file: &Path,
    options: SimulateOptions,
    settings: &Settings,
    args: &TransferArgs,
) -> eyre::Result<()> {
    let mut card = FileCard::from_path(file)
        .wrap_err_with(|| format!("failed to read {}", file.display()))?;
    if let Some(chunk_size) = options.card_chunk_size {
        card = card.with_chunk_size(chunk_size);
    }
    if options.corrupt_checksum {
        card = card.with_checksum(vec![0u8; DIGEST_LEN]);
    }
    if options.no_checksum {
        card = card.without_checksum();
    }

    println!(
        "{}",
        display::info(&format!("Emulating sender for {}", file.display()))
    );

    let config = transfer_config(settings, args)?;
    run_transfer(card, config, args)
}
