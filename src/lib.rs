//! dirserve - serve a directory over HTTP
//!
//! A small static-file server built on tokio and hyper. The file server is
//! the innermost [`handler::Handler`]; optional decorators add
//! `Cache-Control` headers and per-request logging around it, selected once
//! from [`config::Settings`].

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::{Cli, Settings};
pub use error::ServerError;
