//! Errors surfaced by checkpoint resolution.

use crate::transfer::TransferError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    /// The run config asked for a network the registry does not know.
    #[error("unsupported network variant [{0}]")]
    UnsupportedVariant(String),

    /// Transfer tool selector is not one of the implemented tools.
    #[error("transfer tool [{0}] is not implemented")]
    UnsupportedTool(String),

    /// Only raised when re-verification after a fetch is enabled.
    #[error("MD5 mismatch for [{name}] after download: expected {expected}, got {actual}")]
    HashMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl ResolveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ResolveError::Io {
            path: path.into(),
            source,
        }
    }
}
