//! Make sure a verified local copy of a checkpoint exists.

use crate::checksum::{digest_eq, md5_path};
use crate::error::ResolveError;
use crate::transfer::{TransferTool, Transport};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Everything needed to fetch one checkpoint. Built per resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Display name, the checkpoint file name.
    pub name: String,
    pub url: String,
    pub dest: PathBuf,
    /// `None` trusts any existing file at `dest`.
    pub expected_md5: Option<String>,
    pub tool: TransferTool,
}

/// What `ensure_verified_file` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `dest` was already there and verified (or trusted).
    Present,
    /// `dest` was missing and has been downloaded.
    Fetched,
    /// `dest` failed verification, was removed and downloaded again.
    Refetched,
}

/// Ensure `request.dest` exists, downloading it with the requested tool when
/// it is missing or its MD5 does not match.
///
/// A mismatching file is removed and fetched once. The fresh copy is only
/// hashed again when `recheck` is set; otherwise it is returned as-is.
pub fn ensure_verified_file(
    request: &DownloadRequest,
    transport: &Transport,
    recheck: bool,
) -> Result<Outcome, ResolveError> {
    let dest = &request.dest;
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ResolveError::io(parent, e))?;
    }

    if dest.exists() && !dest.is_file() {
        return Err(ResolveError::io(
            dest,
            io::Error::new(io::ErrorKind::Other, "exists but is not a regular file"),
        ));
    }

    let outcome = match (dest.is_file(), request.expected_md5.as_deref()) {
        (false, _) => Outcome::Fetched,
        (true, None) => {
            tracing::debug!(dest = %dest.display(), "checkpoint present, verification disabled");
            return Ok(Outcome::Present);
        }
        (true, Some(expected)) => {
            let actual = md5_path(dest).map_err(|e| ResolveError::io(dest, e))?;
            if digest_eq(&actual, expected) {
                tracing::debug!(dest = %dest.display(), md5 = %actual, "checkpoint present and verified");
                return Ok(Outcome::Present);
            }
            tracing::warn!(
                "MD5 hash mismatch for [{}]: [{}] v.s. [{}]",
                request.name,
                actual,
                expected
            );
            tracing::warn!("removing [{}] and downloading again", dest.display());
            fs::remove_file(dest).map_err(|e| ResolveError::io(dest, e))?;
            Outcome::Refetched
        }
    };

    transport.fetcher(request.tool).fetch(&request.url, dest)?;

    if recheck {
        if let Some(expected) = request.expected_md5.as_deref() {
            let actual = md5_path(dest).map_err(|e| ResolveError::io(dest, e))?;
            if !digest_eq(&actual, expected) {
                return Err(ResolveError::HashMismatch {
                    name: request.name.clone(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }
    }

    Ok(outcome)
}
