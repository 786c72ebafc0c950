//! Process-level error types
//!
//! Only startup, bind and shutdown failures are represented here. Per-request
//! failures never leave the file server: they become HTTP status codes.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid bind address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("directory {}: {reason}", .path.display())]
    InvalidDirectory { path: PathBuf, reason: String },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("graceful shutdown did not finish within {}s", .0.as_secs())]
    ShutdownTimeout(Duration),
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;
