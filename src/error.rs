//! Startup error types
//!
//! Request-time failures never surface here: the file server turns them into
//! HTTP statuses. These errors stop the process before or while binding.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// A setting has a value outside its accepted range
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The layered configuration could not be built or deserialized
    #[error("failed to load configuration: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("could not resolve bind address '{0}'")]
    Resolve(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file {}: {source}", .path.display())]
    Log {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}
