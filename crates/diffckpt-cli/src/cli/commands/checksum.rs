//! Checksum command: compute MD5 of a file.

use anyhow::{Context, Result};
use diffckpt_core::checksum;
use std::path::Path;

/// Compute and print MD5 of the given file.
pub fn run_checksum(path: &Path) -> Result<()> {
    let digest = checksum::md5_path(path).with_context(|| format!("hash {}", path.display()))?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
