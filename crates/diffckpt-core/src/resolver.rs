//! Turn a run configuration into the path of a verified checkpoint.
//!
//! [`plan`] does the lookups and performs no I/O; [`resolve_network_checkpoint`]
//! hands the plan to [`ensure_verified_file`].

use crate::ensure::{ensure_verified_file, DownloadRequest};
use crate::error::ResolveError;
use crate::registry::{Variant, DEFAULT_BASE_URL};
use crate::transfer::{TransferTool, Transport};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Anything that names the network variant a run needs.
pub trait NetworkConfig {
    fn network(&self) -> &str;
}

impl NetworkConfig for str {
    fn network(&self) -> &str {
        self
    }
}

impl NetworkConfig for String {
    fn network(&self) -> &str {
        self
    }
}

/// `[model]` section of a run config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSection {
    pub network: String,
}

/// Run config file as consumed here; other sections are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub model: ModelSection,
}

impl RunConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))
    }
}

impl NetworkConfig for RunConfig {
    fn network(&self) -> &str {
        &self.model.network
    }
}

/// Knobs that are not part of the per-call selection.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Base URL for the HTTP tool.
    pub base_url: String,
    /// Hash a freshly downloaded file once more.
    pub recheck: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            recheck: false,
        }
    }
}

/// Build the download request for `config` without touching disk or network.
pub fn plan<C: NetworkConfig + ?Sized>(
    config: &C,
    root: &Path,
    verify: bool,
    tool: TransferTool,
    base_url: &str,
) -> Result<DownloadRequest, ResolveError> {
    let checkpoint = config.network().parse::<Variant>()?.checkpoint();
    let url = match tool {
        TransferTool::Http => checkpoint.http_url(base_url),
        TransferTool::GoogleDrive => checkpoint.gdrive_url().to_string(),
    };
    Ok(DownloadRequest {
        name: checkpoint.file_name().to_string(),
        url,
        dest: root.join(checkpoint.file_name()),
        expected_md5: verify.then(|| checkpoint.md5().to_string()),
        tool,
    })
}

/// Resolve the checkpoint for `config` under `root`, downloading it if it is
/// missing or fails verification, and return its path.
pub fn resolve_network_checkpoint<C: NetworkConfig + ?Sized>(
    config: &C,
    root: &Path,
    verify: bool,
    tool: TransferTool,
    transport: &Transport,
    options: &ResolveOptions,
) -> Result<PathBuf, ResolveError> {
    let request = plan(config, root, verify, tool, &options.base_url)?;
    let outcome = ensure_verified_file(&request, transport, options.recheck)?;
    tracing::info!(
        network = config.network(),
        path = %request.dest.display(),
        ?outcome,
        "checkpoint resolved"
    );
    Ok(request.dest)
}
