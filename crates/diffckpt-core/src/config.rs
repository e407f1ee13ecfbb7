use crate::registry::DEFAULT_BASE_URL;
use crate::transfer::TransferTool;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// curl tuning for checkpoint transfers (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Overall transfer timeout in seconds; checkpoints are large.
    pub timeout_secs: u64,
    /// Abort when throughput stays below this many bytes/sec ...
    pub low_speed_limit: u32,
    /// ... for this many seconds.
    pub low_speed_time_secs: u64,
    /// Interstitial pages the cloud-drive tool will follow before giving up.
    pub gdrive_max_hops: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 3600,
            low_speed_limit: 1024,
            low_speed_time_secs: 60,
            gdrive_max_hops: 3,
        }
    }
}

/// Global configuration loaded from `~/.config/diffckpt/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffckptConfig {
    /// Directory checkpoints are stored under.
    pub root_dir: PathBuf,
    /// Check the MD5 of an existing checkpoint before trusting it.
    pub verify: bool,
    /// Default transfer tool: "http" or "gdrive".
    pub tool: TransferTool,
    /// Base URL for the HTTP tool.
    pub base_url: String,
    /// Hash the file again after it was downloaded.
    #[serde(default)]
    pub verify_after_fetch: bool,
    #[serde(default)]
    pub transfer: TransferConfig,
}

impl Default for DiffckptConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("pretrained"),
            verify: true,
            tool: TransferTool::Http,
            base_url: DEFAULT_BASE_URL.to_string(),
            verify_after_fetch: false,
            transfer: TransferConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("diffckpt")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DiffckptConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DiffckptConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: DiffckptConfig = toml::from_str(&data)?;
    Ok(cfg)
}
