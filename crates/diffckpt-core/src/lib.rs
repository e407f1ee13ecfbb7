pub mod config;
pub mod logging;

pub mod checksum;
pub mod ensure;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod transfer;

pub use ensure::{ensure_verified_file, DownloadRequest, Outcome};
pub use error::ResolveError;
pub use registry::{Checkpoint, Variant};
pub use resolver::{resolve_network_checkpoint, NetworkConfig, ResolveOptions, RunConfig};
pub use transfer::{Fetcher, TransferError, TransferTool, Transport};
