// Configuration types module
// Raw deserialized settings and the validated, immutable runtime settings

use serde::Deserialize;
use std::path::PathBuf;

use crate::http::CacheMode;
use crate::logger::LogFormat;

/// Settings as produced by the layered config builder, before validation
#[derive(Debug, Deserialize, Clone)]
pub(super) struct RawSettings {
    pub address: String,
    pub port: u16,
    pub verbose: bool,
    pub cache: i64,
    pub root: PathBuf,
    pub index_files: Vec<String>,
    pub keep_alive: bool,
    #[serde(default)]
    pub workers: Option<usize>,
    pub log: RawLogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub(super) struct RawLogSettings {
    pub format: String,
    #[serde(default)]
    pub access_log_file: Option<PathBuf>,
    #[serde(default)]
    pub error_log_file: Option<PathBuf>,
}

/// Runtime settings, constructed once at startup and never mutated
#[derive(Debug, Clone)]
pub struct Settings {
    /// Host name or IP to bind; empty means all interfaces
    pub address: String,
    pub port: u16,
    /// Emit one access log line per request
    pub verbose: bool,
    pub cache: CacheMode,
    /// Absolute, canonical directory being served
    pub root: PathBuf,
    /// Files tried, in order, when a directory is requested
    pub index_files: Vec<String>,
    pub keep_alive: bool,
    /// Runtime worker threads; CPU count when unset
    pub workers: Option<usize>,
    pub log: LogSettings,
}

/// Logging configuration
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    pub format: LogFormat,
    /// Access log file path (stdout if not set)
    pub access_log_file: Option<PathBuf>,
    /// Error log file path (stderr if not set)
    pub error_log_file: Option<PathBuf>,
}
