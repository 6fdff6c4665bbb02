use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tapfile_apdu_transport_pcsc::PcscDeviceManager;

mod commands;
mod config;
mod utils;

use commands::*;
use utils::reader;

#[derive(Parser)]
#[command(version, about = "Receive files from an NFC sender through a PC/SC reader")]
struct Cli {
    /// Optional reader name to use (will auto-detect if not specified)
    #[arg(short, long)]
    reader: Option<String>,

    /// Debug level output
    #[arg(short, long)]
    verbose: bool,

    /// Settings file (defaults to ~/.tapfile/tapfile.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available readers
    List,

    /// Receive a file from the card in the selected reader
    Receive {
        #[command(flatten)]
        transfer: TransferArgs,
    },

    /// Run a transfer against an in-process emulated sender
    Simulate {
        /// File served by the emulated sender
        #[arg(required = true)]
        file: PathBuf,

        /// Bytes answered per READ BINARY by the emulated sender
        #[arg(long)]
        card_chunk_size: Option<usize>,

        /// Make the emulated sender report a wrong checksum
        #[arg(long, conflicts_with = "no_checksum")]
        corrupt_checksum: bool,

        /// Make the emulated sender refuse GET CHECKSUM
        #[arg(long)]
        no_checksum: bool,

        #[command(flatten)]
        transfer: TransferArgs,
    },
}

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let settings = config::load_settings(cli.config.as_deref())?;

    match &cli.command {
        Commands::List => {
            let manager = PcscDeviceManager::new()?;
            reader::list_readers(&manager)?;
        }
        Commands::Receive { transfer } => {
            let manager = PcscDeviceManager::new()?;
            let reader_name = cli.reader.as_deref().or(settings.reader.as_deref());
            receive_command(&manager, reader_name, &settings, transfer)?;
        }
        Commands::Simulate {
            file,
            card_chunk_size,
            corrupt_checksum,
            no_checksum,
            transfer,
        } => simulate_command(
            file,
            SimulateOptions {
                card_chunk_size: *card_chunk_size,
                corrupt_checksum: *corrupt_checksum,
                no_checksum: *no_checksum,
            },
            &settings,
            transfer,
        )?,
    }

    Ok(())
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing_subscriber::filter::LevelFilter::from_level(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .init();
}
