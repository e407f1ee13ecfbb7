//! `diffckpt verify` – report the state of every checkpoint under a root.

use anyhow::{Context, Result};
use diffckpt_core::checksum::{digest_eq, md5_path};
use diffckpt_core::registry::Checkpoint;
use std::path::Path;

pub fn run_verify(root: &Path) -> Result<()> {
    let mut bad = 0usize;
    println!("{:<10} {}", "STATE", "CHECKPOINT");
    for c in Checkpoint::ALL {
        let path = root.join(c.file_name());
        let state = if !path.exists() {
            "missing"
        } else {
            let actual = md5_path(&path).with_context(|| format!("hash {}", path.display()))?;
            if digest_eq(&actual, c.md5()) {
                "ok"
            } else {
                tracing::warn!(
                    "MD5 hash mismatch for [{}]: [{}] v.s. [{}]",
                    c.file_name(),
                    actual,
                    c.md5()
                );
                bad += 1;
                "mismatch"
            }
        };
        println!("{:<10} {}", state, path.display());
    }
    if bad > 0 {
        anyhow::bail!("{} checkpoint(s) failed verification", bad);
    }
    Ok(())
}
