// Configuration module entry point
// Layers defaults, an optional config file, environment variables and CLI
// flags into one immutable `Settings` value

mod cli;
mod types;

pub use cli::Cli;
pub use types::{LogSettings, Settings};

pub use crate::http::CacheMode;
pub use crate::logger::LogFormat;

use crate::error::ServerError;
use types::RawSettings;

/// Environment variable prefix, e.g. `DIRSERVE_PORT`, `DIRSERVE_LOG__FORMAT`
pub const ENV_PREFIX: &str = "DIRSERVE";

impl Settings {
    /// Build settings from the command line plus the lower-priority layers
    ///
    /// Precedence, lowest first: defaults, `--config` file, environment,
    /// flags present on the command line.
    pub fn load(cli: &Cli) -> Result<Self, ServerError> {
        Self::load_with_env(cli, true)
    }

    /// Same as [`Settings::load`], with the `DIRSERVE_*` layer optional
    ///
    /// Passing `false` makes the result depend only on `cli`, the config
    /// file it names and the defaults.
    pub fn load_with_env(cli: &Cli, read_env: bool) -> Result<Self, ServerError> {
        let mut builder = config::Config::builder()
            .set_default("address", "localhost")?
            .set_default("port", 8080)?
            .set_default("verbose", false)?
            .set_default("cache", 0)?
            .set_default("root", ".")?
            .set_default("index_files", vec!["index.html", "index.htm"])?
            .set_default("keep_alive", true)?
            .set_default("log.format", "simple")?;

        if let Some(path) = &cli.config {
            builder = builder.add_source(config::File::from(path.as_path()));
        }

        if read_env {
            builder = builder.add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        builder = builder
            .set_override_option("address", cli.address.clone())?
            .set_override_option("port", cli.port.map(i64::from))?
            .set_override_option("verbose", cli.verbose.then_some(true))?
            .set_override_option("cache", cli.cache)?
            .set_override_option(
                "root",
                cli.directory
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option("log.format", cli.log_format.clone())?
            .set_override_option(
                "log.access_log_file",
                cli.access_log
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option(
                "log.error_log_file",
                cli.error_log
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option(
                "workers",
                cli.workers.map(|w| i64::try_from(w).unwrap_or(i64::MAX)),
            )?;

        let raw: RawSettings = builder.build()?.try_deserialize()?;
        Self::validate(raw)
    }

    fn validate(raw: RawSettings) -> Result<Self, ServerError> {
        let cache = CacheMode::from_seconds(raw.cache)?;
        let format = raw.log.format.parse::<LogFormat>().map_err(ServerError::Config)?;

        if raw.workers == Some(0) {
            return Err(ServerError::Config("workers must be at least 1".to_string()));
        }

        let root = raw.root.canonicalize().map_err(|e| {
            ServerError::Config(format!("cannot serve '{}': {e}", raw.root.display()))
        })?;
        if !root.is_dir() {
            return Err(ServerError::Config(format!(
                "'{}' is not a directory",
                raw.root.display()
            )));
        }

        Ok(Self {
            address: raw.address,
            port: raw.port,
            verbose: raw.verbose,
            cache,
            root,
            index_files: raw.index_files,
            keep_alive: raw.keep_alive,
            workers: raw.workers,
            log: LogSettings {
                format,
                access_log_file: raw.log.access_log_file,
                error_log_file: raw.log.error_log_file,
            },
        })
    }

    /// URL announced at startup
    pub fn display_url(&self, port: u16) -> String {
        if self.address.contains(':') {
            format!("http://[{}]:{port}", self.address)
        } else {
            format!("http://{}:{port}", self.address)
        }
    }
}
