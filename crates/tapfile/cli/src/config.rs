use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{OptionExt, WrapErr};
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};
use tapfile::{FileIdentity, TransferConfig};

/// Values from `~/.tapfile/tapfile.toml` and `TAPFILE_*` environment variables
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub reader: Option<String>,
    pub output_dir: Option<PathBuf>,
    /// AID in hex
    pub aid: Option<String>,
    pub chunk_size: Option<u8>,
    pub inter_chunk_delay_ms: Option<u64>,
    pub audit_log: Option<bool>,
    pub verify_written: Option<bool>,
}

impl Settings {
    /// Build the transfer configuration, leaving unset values at their defaults
    pub fn transfer_config(&self) -> eyre::Result<TransferConfig> {
        let mut config = TransferConfig::new();
        if let Some(aid) = &self.aid {
            let aid = hex::decode(aid.trim()).wrap_err("aid is not valid hex")?;
            config = config.with_aid(aid);
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }
        if let Some(chunk_size) = self.chunk_size {
            config = config.with_chunk_size(chunk_size);
        }
        if let Some(ms) = self.inter_chunk_delay_ms {
            config = config.with_inter_chunk_delay(Duration::from_millis(ms));
        }
        if let Some(enabled) = self.audit_log {
            config = config.with_audit_log(enabled);
        }
        if let Some(enabled) = self.verify_written {
            config = config.with_verify_written(enabled);
        }
        Ok(config)
    }
}

/// Returns the base config directory for tapfile
pub fn config_dir() -> eyre::Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .ok_or_eyre("home directory not found")?;
    Ok(PathBuf::from(home).join(".tapfile"))
}

/// Load settings from `path`, or from the default location when `None`
///
/// A missing file yields default settings.
pub fn load_settings(path: Option<&Path>) -> eyre::Result<Settings> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config_dir()?.join("tapfile.toml"),
    };

    Figment::new()
        .merge(Toml::file(&path))
        .merge(Env::prefixed("TAPFILE_"))
        .extract()
        .wrap_err_with(|| format!("failed to load settings from {}", path.display()))
}

/// Identity used when the sender provides no metadata, `received_file_<timestamp>.bin`
pub fn timestamped_identity() -> FileIdentity {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    FileIdentity::new(&format!("received_file_{stamp}"), "bin")
}
