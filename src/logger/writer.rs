//! Log writer module
//!
//! Thread-safe log writing to stdout/stderr or append-mode files.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use crate::error::ServerError;

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl LogTarget {
    fn open(path: Option<&Path>, console: Self) -> Result<Self, ServerError> {
        match path {
            Some(path) => open_log_file(path)
                .map(|file| Self::File(Mutex::new(file)))
                .map_err(|source| ServerError::Log {
                    path: path.to_path_buf(),
                    source,
                }),
            None => Ok(console),
        }
    }

    fn write(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{message}");
                }
            }
        }
    }
}

/// Access and error log targets
pub struct LogWriter {
    access: LogTarget,
    error: LogTarget,
}

impl LogWriter {
    fn new(access_log_file: Option<&Path>, error_log_file: Option<&Path>) -> Result<Self, ServerError> {
        Ok(Self {
            access: LogTarget::open(access_log_file, LogTarget::Stdout)?,
            error: LogTarget::open(error_log_file, LogTarget::Stderr)?,
        })
    }

    pub fn write_access(&self, message: &str) {
        self.access.write(message);
    }

    pub fn write_error(&self, message: &str) {
        self.error.write(message);
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global log writer
///
/// Called once at startup. A second call is an error.
pub fn init(access_log_file: Option<&Path>, error_log_file: Option<&Path>) -> Result<(), ServerError> {
    let writer = LogWriter::new(access_log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        ServerError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        ))
    })
}

/// Get the global log writer, if `init` has run
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_target_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/access.log");

        let writer = LogWriter::new(Some(path.as_path()), None).unwrap();
        writer.write_access("first");
        writer.write_access("second");

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "first\nsecond\n");
    }

    #[test]
    fn test_unopenable_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending
        let result = LogWriter::new(None, Some(dir.path()));
        assert!(matches!(result, Err(ServerError::Log { .. })));
    }
}
