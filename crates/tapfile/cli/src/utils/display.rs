//! Display utilities for the tapfile CLI

use std::fmt::Display;
use std::io::{self, Write};

use colored::Colorize;
use tapfile::{ChecksumOutcome, Progress, TransferReport};

/// A formatted section title
pub struct SectionTitle(pub &'static str);

impl Display for SectionTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\n{}", self.0.bold().underline())
    }
}

/// Format a section header
pub const fn section_title(title: &'static str) -> SectionTitle {
    SectionTitle(title)
}

/// Format a success message
pub fn success(message: &str) -> String {
    format!("✅ {}", message.green().bold())
}

/// Format a warning message
pub fn warning(message: &str) -> String {
    format!("⚠️  {}", message.yellow().bold())
}

/// Format an error message
pub fn failure(message: &str) -> String {
    format!("❌ {}", message.red().bold())
}

/// Format an info message
pub fn info(message: &str) -> String {
    format!("ℹ️  {}", message.blue())
}

/// Format a key-value section
pub fn key_value_box(title: &str, items: Vec<(&str, String)>) -> String {
    let mut result = format!("{}", title.bold().underline());

    for (key, value) in items {
        result.push_str(&format!("\n  {}: {}", key.bold(), value));
    }

    result
}

/// Single-line progress indicator, `Received X of Y bytes (P%)`
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    started: bool,
}

impl Progress for ConsoleProgress {
    fn on_selected(&mut self, file_size: usize) {
        println!("{}", info(&format!("File size: {file_size} bytes")));
    }

    fn on_chunk(&mut self, received: usize, total: usize) {
        self.started = true;
        let percent = received as f64 * 100.0 / total.max(1) as f64;
        print!("\rReceived {received} of {total} bytes ({percent:.1}%)");
        let _ = io::stdout().flush();
    }
}

impl ConsoleProgress {
    /// Terminate the progress line
    pub fn finish(&self) {
        if self.started {
            println!();
        }
    }
}

/// Summary of a finished transfer
pub fn report_summary(report: &TransferReport) -> String {
    let checksum = match &report.checksum {
        Some(ChecksumOutcome::Verified { digest }) => format!("verified ({digest})").green(),
        Some(outcome @ ChecksumOutcome::Mismatch { .. }) => outcome.to_string().red(),
        Some(outcome @ ChecksumOutcome::Unavailable { .. }) => outcome.to_string().yellow(),
        None => "not checked".normal(),
    };

    let mut items = vec![
        ("File", report.identity.to_string()),
        (
            "Received",
            format!(
                "{} of {} bytes ({:.1}%)",
                report.total_received,
                report.file_size,
                report.percent_received()
            ),
        ),
        ("Chunks", report.chunks.to_string()),
        ("Checksum", checksum.to_string()),
    ];
    if let Some(matches) = report.written_digest_matches {
        items.push((
            "Written copy",
            if matches { "matches" } else { "DIFFERS" }.to_string(),
        ));
    }
    if let Some(path) = &report.audit_path {
        items.push(("Audit log", path.display().to_string()));
    }

    key_value_box("Transfer summary", items)
}
