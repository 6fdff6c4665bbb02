mod receive;
mod simulate;

pub use receive::*;
pub use simulate::*;

pub use crate::utils::TransferArgs;

use std::time::Duration;

use eyre::eyre;
use tapfile::{Receiver, Resolution, Resolver, TransferConfig};
use tapfile_apdu_core::CardTransport;
use tracing::info;

use crate::config::{Settings, timestamped_identity};
use crate::utils::Decision;
use crate::utils::display::{self, ConsoleProgress};
use crate::utils::prompt::default_confirmation;

/// Merge settings and command line flags; flags win
fn transfer_config(settings: &Settings, args: &TransferArgs) -> eyre::Result<TransferConfig> {
    let mut config = settings
        .transfer_config()?
        .with_default_identity(timestamped_identity());
    if let Some(dir) = &args.output_dir {
        config = config.with_output_dir(dir);
    }
    if let Some(ms) = args.delay_ms {
        config = config.with_inter_chunk_delay(Duration::from_millis(ms));
    }
    if args.no_audit {
        config = config.with_audit_log(false);
    }
    Ok(config)
}

fn resolver(decision: Decision) -> Resolver {
    match decision {
        Decision::Ask => Resolver::with_confirmation(Box::new(default_confirmation)),
        Decision::Keep => Resolver::with_confirmation(Box::new(|_: &str| true)),
        Decision::Decline => Resolver::new(),
    }
}

/// Run one transfer over `transport`, print the outcome and resolve the artifact
fn run_transfer<T: CardTransport>(
    transport: T,
    config: TransferConfig,
    args: &TransferArgs,
) -> eyre::Result<()> {
    let mut receiver = Receiver::new(transport, config)?;

    let mut progress = ConsoleProgress::default();
    let report = receiver.run_with_progress(&mut progress);
    progress.finish();

    println!("{}", display::section_title("Result"));
    println!("{}", display::report_summary(&report));

    if let Some(failure) = &report.failure {
        println!("{}", display::failure(&failure.to_string()));
        if let Some(status) = failure.status() {
            println!(
                "{}",
                display::info(&format!("Card status {status}: {}", status.description()))
            );
        }
    }

    let resolution = resolver(args.decision()).resolve(&report)?;
    info!(%resolution, "Resolved transfer");
    match &resolution {
        Resolution::Promoted(_) => println!("{}", display::success(&resolution.to_string())),
        Resolution::KeptTemporary { .. } => {
            println!("{}", display::warning(&resolution.to_string()))
        }
        Resolution::NothingStored => println!("{}", display::info(&resolution.to_string())),
    }

    if report.failure.is_some() {
        return Err(eyre!("file reception incomplete"));
    }
    Ok(())
}
