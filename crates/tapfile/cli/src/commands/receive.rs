use tapfile_apdu_transport_pcsc::{PcscConfig, PcscDeviceManager};
use tracing::info;

use super::{TransferArgs, run_transfer, transfer_config};
use crate::config::Settings;
use crate::utils::{display, reader};

/// Receive a file through a PC/SC reader
pub fn receive_command(
    manager: &PcscDeviceManager,
    reader_name: Option<&str>,
    settings: &Settings,
    args: &TransferArgs,
) -> eyre::Result<()> {
    let reader = match reader_name {
        Some(name) => reader::find_reader_by_name(manager, name)?,
        None => reader::find_reader_with_card(manager)?,
    };

    info!("Using reader: {}", reader.name());
    println!("{}", display::info(&format!("Using reader: {}", reader.name())));

    let config = transfer_config(settings, args)?;
    let transport = manager.open_reader_with_config(reader.name(), transport_config())?;

    run_transfer(transport, config, args)
}

/// Reader connection settings; a card reset fails the exchange instead of resending it
fn transport_config() -> PcscConfig {
    PcscConfig::default().with_auto_reconnect(false)
}
