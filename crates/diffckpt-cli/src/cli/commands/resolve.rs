//! `diffckpt resolve` – ensure a verified checkpoint exists and print its path.

use anyhow::Result;
use diffckpt_core::config::DiffckptConfig;
use diffckpt_core::resolver::{resolve_network_checkpoint, ResolveOptions, RunConfig};
use diffckpt_core::transfer::{TransferTool, Transport};
use std::path::PathBuf;

/// Flags of the resolve subcommand; unset ones fall back to config.toml.
#[derive(Debug, Default)]
pub struct ResolveArgs {
    pub network: Option<String>,
    pub config: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub no_verify: bool,
    pub tool: Option<TransferTool>,
    pub recheck: bool,
}

/// Flags merged over config.toml.
#[derive(Debug, Clone)]
pub struct Effective {
    pub network: String,
    pub root: PathBuf,
    pub verify: bool,
    pub tool: TransferTool,
    pub options: ResolveOptions,
}

impl ResolveArgs {
    /// `--no-verify` can only turn verification off; `--recheck` can only turn it on.
    pub fn effective(self, cfg: &DiffckptConfig) -> Result<Effective> {
        let network = match (self.network, self.config) {
            (Some(network), _) => network,
            (None, Some(path)) => RunConfig::load(&path)?.model.network,
            (None, None) => anyhow::bail!("either --network or --config is required"),
        };
        Ok(Effective {
            network,
            root: self.root.unwrap_or_else(|| cfg.root_dir.clone()),
            verify: cfg.verify && !self.no_verify,
            tool: self.tool.unwrap_or(cfg.tool),
            options: ResolveOptions {
                base_url: cfg.base_url.clone(),
                recheck: self.recheck || cfg.verify_after_fetch,
            },
        })
    }
}

pub fn run_resolve(cfg: &DiffckptConfig, args: ResolveArgs) -> Result<PathBuf> {
    let eff = args.effective(cfg)?;
    let transport = Transport::from_config(cfg);
    let path = resolve_network_checkpoint(
        eff.network.as_str(),
        &eff.root,
        eff.verify,
        eff.tool,
        &transport,
        &eff.options,
    )?;
    println!("{}", path.display());
    Ok(path)
}
