use eyre::eyre;
use tapfile_apdu_transport_pcsc::{PcscDeviceManager, PcscReader};

/// Find a reader with a specific name
pub fn find_reader_by_name(
    manager: &PcscDeviceManager,
    reader_name: &str,
) -> eyre::Result<PcscReader> {
    let readers = manager.list_readers()?;

    readers
        .iter()
        .find(|r| r.name() == reader_name)
        .cloned()
        .ok_or_else(|| eyre!("Reader '{}' not found", reader_name))
}

/// List all available readers
pub fn list_readers(manager: &PcscDeviceManager) -> eyre::Result<()> {
    let readers = manager.list_readers()?;

    if readers.is_empty() {
        println!("No readers found!");
        return Ok(());
    }

    println!("Available readers:");
    for (i, reader) in readers.iter().enumerate() {
        let status = if reader.has_card() {
            "card present"
        } else {
            "no card"
        };
        println!("{}. {} ({})", i + 1, reader.name(), status);
    }

    Ok(())
}

/// Find a reader with a card inserted
pub fn find_reader_with_card(manager: &PcscDeviceManager) -> eyre::Result<PcscReader> {
    let readers = manager.list_readers()?;

    if readers.is_empty() {
        return Err(eyre!("No readers found!"));
    }

    readers
        .iter()
        .find(|r| r.has_card())
        .cloned()
        .ok_or_else(|| eyre!("No card found in any reader!"))
}
