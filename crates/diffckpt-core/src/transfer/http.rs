//! Plain HTTP GET of a checkpoint URL.

use super::get::{perform, persist, stage};
use super::{CurlOptions, Fetcher, TransferError};
use std::path::Path;

pub struct HttpFetcher {
    opts: CurlOptions,
}

impl HttpFetcher {
    pub fn new(opts: CurlOptions) -> Self {
        Self { opts }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), TransferError> {
        tracing::info!("downloading [{}] to [{}]", url, dest.display());
        let mut staged = stage(dest)?;
        let mut easy = self.opts.easy()?;
        let resp = perform(&mut easy, url, staged.as_file_mut())?;
        if !resp.is_success() {
            return Err(TransferError::Http {
                url: url.to_string(),
                code: resp.code,
            });
        }
        persist(staged, dest)?;
        tracing::debug!(bytes = resp.bytes, dest = %dest.display(), "download complete");
        Ok(())
    }
}
