//! CLI for the diffckpt checkpoint resolver.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use diffckpt_core::config;
use diffckpt_core::transfer::TransferTool;
use std::path::PathBuf;

use commands::{run_checksum, run_list, run_resolve, run_verify, ResolveArgs};

/// Top-level CLI for diffckpt.
#[derive(Debug, Parser)]
#[command(name = "diffckpt")]
#[command(about = "diffckpt: fetch and verify pretrained diffusion checkpoints", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Make sure the checkpoint for a network variant is present and print its path.
    Resolve {
        /// Network variant identifier, e.g. ddpm.unet.
        #[arg(long, required_unless_present = "config", conflicts_with = "config")]
        network: Option<String>,
        /// Run config file whose [model] network names the variant.
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Directory checkpoints live in (default from config.toml).
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
        /// Trust an existing file without checking its MD5.
        #[arg(long)]
        no_verify: bool,
        /// Transfer tool: http or gdrive (aliases torch_hub, gdown).
        #[arg(long)]
        tool: Option<TransferTool>,
        /// Check the MD5 again after downloading.
        #[arg(long)]
        recheck: bool,
    },

    /// List known network variants and their checkpoints.
    List,

    /// Check every checkpoint under the root directory against the registry.
    Verify {
        /// Directory checkpoints live in (default from config.toml).
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
    },

    /// Compute MD5 of a file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Resolve {
                network,
                config,
                root,
                no_verify,
                tool,
                recheck,
            } => {
                let args = ResolveArgs {
                    network,
                    config,
                    root,
                    no_verify,
                    tool,
                    recheck,
                };
                run_resolve(&cfg, args)?;
            }
            CliCommand::List => run_list(),
            CliCommand::Verify { root } => {
                let root = root.unwrap_or_else(|| cfg.root_dir.clone());
                run_verify(&root)?;
            }
            CliCommand::Checksum { path } => run_checksum(&path)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
