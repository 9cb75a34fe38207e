// Command line module
// clap definition of the flags; absent options stay `None` so lower layers apply

use clap::Parser;
use std::path::PathBuf;

/// Serve a directory over HTTP
///
/// Options left off the command line fall back to `DIRSERVE_*` environment
/// variables, then the `--config` file, then built-in defaults.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Port to bind to [default: 8080]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to [default: localhost]
    #[arg(short = 'b', long)]
    pub address: Option<String>,

    /// Log every request
    #[arg(short, long)]
    pub verbose: bool,

    /// Cache policy: 0 = no header, -1 = no-cache, N > 0 = max-age=N [default: 0]
    #[arg(short, long, allow_negative_numbers = true, value_name = "SECONDS")]
    pub cache: Option<i64>,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Access log format [default: simple]
    #[arg(long, value_parser = ["simple", "common", "combined", "json"])]
    pub log_format: Option<String>,

    /// Write access log lines to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub access_log: Option<PathBuf>,

    /// Write warnings and errors to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub error_log: Option<PathBuf>,

    /// Runtime worker threads [default: number of CPUs]
    #[arg(long)]
    pub workers: Option<usize>,

    /// Directory to serve [default: .]
    pub directory: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from(["dirserve", "-p", "9000", "-b", "0.0.0.0", "-v", "-c", "-1", "public"])
            .unwrap();
        assert_eq!(cli.port, Some(9000));
        assert_eq!(cli.address.as_deref(), Some("0.0.0.0"));
        assert!(cli.verbose);
        assert_eq!(cli.cache, Some(-1));
        assert_eq!(cli.directory, Some(PathBuf::from("public")));
    }

    #[test]
    fn test_absent_flags_stay_unset() {
        let cli = Cli::try_parse_from(["dirserve"]).unwrap();
        assert!(cli.port.is_none());
        assert!(cli.cache.is_none());
        assert!(cli.directory.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_help_is_explicit() {
        let err = Cli::try_parse_from(["dirserve", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Cli::try_parse_from(["dirserve", "-p", "70000"]).is_err());
        assert!(Cli::try_parse_from(["dirserve", "--log-format", "xml"]).is_err());
        assert!(Cli::try_parse_from(["dirserve", "--bogus"]).is_err());
    }
}
