//! Access log format module
//!
//! Supported formats:
//! - `simple` - `Served "<uri>" in <duration> [<status>]`
//! - `common` (Common Log Format - CLF)
//! - `combined` (Apache/Nginx combined format)
//! - `json` (one JSON object per line)

use chrono::Local;
use hyper::{Request, StatusCode};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Peer address of the connection a request arrived on
///
/// The server stores it in the request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAddr(pub SocketAddr);

/// Access log line layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Simple,
    Common,
    Combined,
    Json,
}

impl LogFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Common => "common",
            Self::Combined => "combined",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "common" => Ok(Self::Common),
            "combined" => Ok(Self::Combined),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown log format '{other}' (expected simple, common, combined or json)"
            )),
        }
    }
}

/// Access log entry for one request
///
/// Created when the request enters the logging decorator and completed with
/// the status of the response the inner chain returned.
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client address, `-` when unknown
    pub remote_addr: String,
    pub time: chrono::DateTime<Local>,
    pub method: String,
    /// Request target as received (path and query)
    pub uri: String,
    pub http_version: &'static str,
    pub status: u16,
    /// Response body size in bytes
    pub body_bytes: u64,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub elapsed: Duration,
}

impl AccessLogEntry {
    /// Capture request-side fields; status defaults to 200 until `finish`
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        Self {
            remote_addr: req
                .extensions()
                .get::<RemoteAddr>()
                .map_or_else(|| "-".to_string(), |addr| addr.0.ip().to_string()),
            time: Local::now(),
            method: req.method().to_string(),
            uri: req.uri().to_string(),
            http_version: version_str(req.version()),
            status: StatusCode::OK.as_u16(),
            body_bytes: 0,
            referer: header("referer"),
            user_agent: header("user-agent"),
            elapsed: Duration::ZERO,
        }
    }

    /// Record the outcome of the request
    pub fn finish(&mut self, status: StatusCode, body_bytes: u64, elapsed: Duration) {
        self.status = status.as_u16();
        self.body_bytes = body_bytes;
        self.elapsed = elapsed;
    }

    pub fn format(&self, format: LogFormat) -> String {
        match format {
            LogFormat::Simple => self.format_simple(),
            LogFormat::Common => self.format_common(),
            LogFormat::Combined => self.format_combined(),
            LogFormat::Json => self.format_json(),
        }
    }

    fn format_simple(&self) -> String {
        format!("Served \"{}\" in {:?} [{}]", self.uri, self.elapsed, self.status)
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.uri,
            self.http_version,
            self.status,
            self.body_bytes,
        )
    }

    /// Common format followed by `"$http_referer" "$http_user_agent"`
    fn format_combined(&self) -> String {
        format!(
            "{} \"{}\" \"{}\"",
            self.format_common(),
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "uri": self.uri,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "duration_us": u64::try_from(self.elapsed.as_micros()).unwrap_or(u64::MAX),
        })
        .to_string()
    }
}

fn version_str(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
