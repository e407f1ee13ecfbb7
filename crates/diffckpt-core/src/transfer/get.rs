//! Single blocking GET with libcurl, body streamed into a staging file.

use super::TransferError;
use std::io::{self, Write};
use std::path::Path;
use std::str;
use tempfile::NamedTempFile;

/// Status and headers of the final response (after redirects).
#[derive(Debug, Default)]
pub(super) struct Response {
    pub code: u32,
    pub headers: Vec<String>,
    pub bytes: u64,
}

impl Response {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find_map(|line| {
            let (n, v) = line.split_once(':')?;
            n.trim().eq_ignore_ascii_case(name).then(|| v.trim())
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_html(&self) -> bool {
        self.header("content-type")
            .map(|v| v.to_ascii_lowercase().starts_with("text/html"))
            .unwrap_or(false)
    }

    pub fn is_attachment(&self) -> bool {
        self.header("content-disposition").is_some()
    }
}

/// Staging file next to `dest`, so persisting it is a rename on the same filesystem.
pub(super) fn stage(dest: &Path) -> Result<NamedTempFile, TransferError> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    tempfile::Builder::new()
        .prefix(".diffckpt-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|source| TransferError::Io {
            path: dir.to_path_buf(),
            source,
        })
}

/// Move a completed staging file over `dest`.
pub(super) fn persist(staged: NamedTempFile, dest: &Path) -> Result<(), TransferError> {
    staged
        .persist(dest)
        .map(|_| ())
        .map_err(|e| TransferError::Io {
            path: dest.to_path_buf(),
            source: e.error,
        })
}

/// GET `url` on `easy`, writing the body to `out`. Headers of intermediate
/// redirect responses are discarded. Non-2xx statuses are returned, not raised.
pub(super) fn perform(
    easy: &mut curl::easy::Easy,
    url: &str,
    out: &mut dyn Write,
) -> Result<Response, TransferError> {
    easy.url(url)?;
    easy.get(true)?;

    let mut headers: Vec<String> = Vec::new();
    let mut bytes = 0u64;
    let mut write_err: Option<io::Error> = None;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                let line = s.trim_end();
                if line.starts_with("HTTP/") {
                    headers.clear();
                }
                if !line.is_empty() {
                    headers.push(line.to_string());
                }
            }
            true
        })?;
        transfer.write_function(|data| match out.write_all(data) {
            Ok(()) => {
                bytes += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_err = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Some(source) = write_err {
        return Err(TransferError::Write {
            url: url.to_string(),
            source,
        });
    }
    performed?;
    out.flush().map_err(|source| TransferError::Write {
        url: url.to_string(),
        source,
    })?;

    let code = easy.response_code()?;
    Ok(Response {
        code,
        headers,
        bytes,
    })
}
