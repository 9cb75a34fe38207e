//! HTTP cache control module
//!
//! Provides `ETag` generation, `Last-Modified` dates, conditional request
//! evaluation and the `Cache-Control` policy applied by the cache decorators.

use chrono::{DateTime, Utc};
use hyper::header::{HeaderMap, HeaderValue, IF_MODIFIED_SINCE, IF_NONE_MATCH};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

use crate::error::ServerError;

/// Generate `ETag` using fast hashing
///
/// # Returns
/// Quoted `ETag` string, e.g., `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single `ETag`, a comma separated list, weak validators
/// (`W/"abc"`) and the `*` wildcard.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').any(|e| {
            let e = e.trim();
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}

/// Format a timestamp as an IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`)
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Parse an HTTP date header; `None` for anything unparseable
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Decide whether a conditional GET can be answered with `304 Not Modified`
///
/// `If-None-Match` takes precedence; `If-Modified-Since` is only consulted
/// when it is absent. Modification times compare at second precision since
/// that is all an HTTP date carries.
pub fn is_not_modified(headers: &HeaderMap, etag: Option<&str>, modified: Option<SystemTime>) -> bool {
    if let Some(if_none_match) = headers.get(IF_NONE_MATCH) {
        return etag.is_some_and(|etag| check_etag_match(if_none_match.to_str().ok(), etag));
    }

    let since = headers
        .get(IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_http_date);

    match (since, modified) {
        (Some(since), Some(modified)) => {
            let modified = DateTime::<Utc>::from(modified).timestamp();
            modified > 0 && modified <= since.timestamp()
        }
        _ => false,
    }
}

/// Response caching policy selected once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Leave `Cache-Control` alone
    #[default]
    Disabled,
    /// `Cache-Control: no-cache`, conditional request headers stripped
    NoCache,
    /// `Cache-Control: max-age=N` with N > 0
    MaxAge(u32),
}

impl CacheMode {
    /// Map the integer `--cache` setting: 0 disables, -1 forces no-cache,
    /// a positive value is a max-age in seconds.
    pub fn from_seconds(seconds: i64) -> Result<Self, ServerError> {
        match seconds {
            0 => Ok(Self::Disabled),
            -1 => Ok(Self::NoCache),
            n if n > 0 => u32::try_from(n).map(Self::MaxAge).map_err(|_| {
                ServerError::Config(format!("cache max-age {n} is too large"))
            }),
            n => Err(ServerError::Config(format!(
                "cache must be -1, 0 or a positive number of seconds, got {n}"
            ))),
        }
    }

    /// `Cache-Control` response value, `None` when disabled
    pub fn header_value(self) -> Option<HeaderValue> {
        match self {
            Self::Disabled => None,
            Self::NoCache => Some(HeaderValue::from_static("no-cache")),
            Self::MaxAge(secs) => HeaderValue::from_str(&format!("max-age={secs}")).ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_etag_consistency() {
        assert_eq!(generate_etag(b"same content"), generate_etag(b"same content"));
        assert_ne!(generate_etag(b"content a"), generate_etag(b"content b"));
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"abc123\"";
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\", \"abc123\""), etag));
        assert!(check_etag_match(Some("W/\"abc123\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"different\""), etag));
        assert!(!check_etag_match(None, etag));
    }

    #[test]
    fn test_http_date_round_trip_is_second_precise() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777);
        let formatted = format_http_date(time);
        assert_eq!(formatted, "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(parse_http_date(&formatted).map(|d| d.timestamp()), Some(784_111_777));
        assert!(parse_http_date("yesterday").is_none());
    }

    #[test]
    fn test_if_modified_since() {
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let mut headers = HeaderMap::new();
        assert!(!is_not_modified(&headers, None, Some(modified)));

        headers.insert(
            IF_MODIFIED_SINCE,
            HeaderValue::from_str(&format_http_date(modified)).unwrap(),
        );
        assert!(is_not_modified(&headers, None, Some(modified)));

        let earlier = modified - Duration::from_secs(60);
        headers.insert(
            IF_MODIFIED_SINCE,
            HeaderValue::from_str(&format_http_date(earlier)).unwrap(),
        );
        assert!(!is_not_modified(&headers, None, Some(modified)));
    }

    #[test]
    fn test_if_none_match_wins_over_if_modified_since() {
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let mut headers = HeaderMap::new();
        headers.insert(IF_NONE_MATCH, HeaderValue::from_static("\"stale\""));
        headers.insert(
            IF_MODIFIED_SINCE,
            HeaderValue::from_str(&format_http_date(modified)).unwrap(),
        );
        assert!(!is_not_modified(&headers, Some("\"fresh\""), Some(modified)));
        assert!(is_not_modified(&headers, Some("\"stale\""), Some(modified)));
    }

    #[test]
    fn test_cache_mode_from_seconds() {
        assert_eq!(CacheMode::from_seconds(0).unwrap(), CacheMode::Disabled);
        assert_eq!(CacheMode::from_seconds(-1).unwrap(), CacheMode::NoCache);
        assert_eq!(CacheMode::from_seconds(30).unwrap(), CacheMode::MaxAge(30));
        assert!(CacheMode::from_seconds(-2).is_err());
        assert!(CacheMode::from_seconds(i64::MAX).is_err());
    }

    #[test]
    fn test_cache_mode_header_value() {
        assert!(CacheMode::Disabled.header_value().is_none());
        assert_eq!(CacheMode::NoCache.header_value().unwrap(), "no-cache");
        assert_eq!(CacheMode::MaxAge(30).header_value().unwrap(), "max-age=30");
    }
}
