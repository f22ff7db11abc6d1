//! Error types shared by the store and the bootstrap parser.
//!
//! Migration steps have no error channel; only loading, storing and
//! address parsing can fail.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::network::Network;

#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file does not exist yet. This is the first-run
    /// signal, not a corruption signal.
    #[error("node configuration not found at {path:?}, please run init first")]
    NotInitialized { path: PathBuf },

    #[error("failed to decode configuration {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode configuration: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid peer address {addr:?}: {reason}")]
    InvalidAddress { addr: String, reason: String },

    #[error(
        "failed to parse hardcoded {network} bootstrap peers: {source}\n\
         This is a packaging defect, please report it upstream."
    )]
    DefaultBootstrap {
        network: Network,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to replace {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_address(addr: &str, reason: impl ToString) -> Self {
        Error::InvalidAddress {
            addr: addr.to_string(),
            reason: reason.to_string(),
        }
    }
}
