//! Logger module
//!
//! Provides logging utilities for the server:
//! - Startup announcement
//! - Access logging in several formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::{AccessLogEntry, LogFormat, RemoteAddr};

use std::path::Path;
use std::sync::Arc;

use crate::config::LogSettings;
use crate::error::ServerError;

/// Destination for completed access log entries
pub type AccessSink = Arc<dyn Fn(&AccessLogEntry) + Send + Sync>;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(settings: &LogSettings) -> Result<(), ServerError> {
    writer::init(
        settings.access_log_file.as_deref(),
        settings.error_log_file.as_deref(),
    )
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Announce the served directory and listening URL on stdout
pub fn log_server_start(root: &Path, url: &str) {
    println!("Serving {} at {url}", root.display());
}

pub fn log_shutdown() {
    write_error("[INFO] Shutdown signal received, no longer accepting connections");
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write_error(&format!("[ERROR] Failed to serve connection: {err}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: LogFormat) {
    write_access(&entry.format(format));
}

/// Sink writing entries to the access log in `format`
pub fn access_sink(format: LogFormat) -> AccessSink {
    Arc::new(move |entry: &AccessLogEntry| log_access(entry, format))
}
