//! Transfer tools: the ways remote checkpoint bytes reach local disk.
//!
//! Each tool is a [`Fetcher`]; a [`Transport`] holds one fetcher per
//! [`TransferTool`] so the resolver never branches on tool names itself.

mod gdrive;
mod get;
mod http;

pub use gdrive::GoogleDriveFetcher;
pub use http::HttpFetcher;

use crate::config::{DiffckptConfig, TransferConfig};
use crate::error::ResolveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Failure inside a transfer tool. Passed through to callers unwrapped.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),

    #[error("GET {url} returned HTTP {code}")]
    Http { url: String, code: u32 },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the response body failed (disk full, staging file gone, ...).
    #[error("writing body of {url}: {source}")]
    Write {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// Cloud-drive URL has no `id` query parameter.
    #[error("no file id in cloud-drive URL {url}")]
    MissingFileId { url: String },

    /// Cloud-drive answered with a page that links to no download.
    #[error("no download link on cloud-drive page for {url}")]
    NoDownloadLink { url: String },

    /// Still on confirmation pages after following `hops` of them.
    #[error("cloud-drive hop limit reached after {hops} confirmation page(s) for {url}")]
    TooManyHops { url: String, hops: u32 },
}

/// "Fetch URL to local path". Implementations write the complete body to
/// `dest` or return an error; `dest`'s parent directory already exists.
pub trait Fetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), TransferError>;
}

/// Selector for the transfer tool used to download a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TransferTool {
    /// Plain HTTP GET of `<base_url>/<file>`.
    #[default]
    Http,
    /// Cloud-drive download through the per-file share URL.
    GoogleDrive,
}

impl TransferTool {
    pub fn as_str(self) -> &'static str {
        match self {
            TransferTool::Http => "http",
            TransferTool::GoogleDrive => "gdrive",
        }
    }
}

impl FromStr for TransferTool {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" | "torch_hub" => Ok(TransferTool::Http),
            "gdrive" | "gdown" => Ok(TransferTool::GoogleDrive),
            other => Err(ResolveError::UnsupportedTool(other.to_string())),
        }
    }
}

impl TryFrom<String> for TransferTool {
    type Error = ResolveError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TransferTool> for String {
    fn from(tool: TransferTool) -> Self {
        tool.as_str().to_string()
    }
}

impl fmt::Display for TransferTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// libcurl settings shared by both tools.
#[derive(Debug, Clone, Copy)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
}

impl From<&TransferConfig> for CurlOptions {
    fn from(cfg: &TransferConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            low_speed_limit: cfg.low_speed_limit,
            low_speed_time: Duration::from_secs(cfg.low_speed_time_secs),
        }
    }
}

impl Default for CurlOptions {
    fn default() -> Self {
        (&TransferConfig::default()).into()
    }
}

impl CurlOptions {
    /// A fresh handle with redirects, timeouts and user agent applied.
    pub(crate) fn easy(&self) -> Result<curl::easy::Easy, TransferError> {
        let mut easy = curl::easy::Easy::new();
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(concat!("diffckpt/", env!("CARGO_PKG_VERSION")))?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        easy.low_speed_limit(self.low_speed_limit)?;
        easy.low_speed_time(self.low_speed_time)?;
        Ok(easy)
    }
}

/// One fetcher per transfer tool.
pub struct Transport {
    http: Box<dyn Fetcher>,
    gdrive: Box<dyn Fetcher>,
}

impl Transport {
    pub fn new(http: Box<dyn Fetcher>, gdrive: Box<dyn Fetcher>) -> Self {
        Self { http, gdrive }
    }

    pub fn from_config(cfg: &DiffckptConfig) -> Self {
        let opts = CurlOptions::from(&cfg.transfer);
        Self::new(
            Box::new(HttpFetcher::new(opts)),
            Box::new(GoogleDriveFetcher::new(opts, cfg.transfer.gdrive_max_hops)),
        )
    }

    pub fn fetcher(&self, tool: TransferTool) -> &dyn Fetcher {
        match tool {
            TransferTool::Http => self.http.as_ref(),
            TransferTool::GoogleDrive => self.gdrive.as_ref(),
        }
    }
}
