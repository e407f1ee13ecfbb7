//! MD5 digests of checkpoint files.
//!
//! Checkpoints run to hundreds of megabytes, so the file is hashed in chunks
//! rather than read into memory.

use md5::{Digest, Md5};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Compute MD5 of a file and return the digest as lowercase hex.
pub fn md5_path(path: &Path) -> io::Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compare two hex digests, ignoring case.
pub fn digest_eq(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
