//! Handler decorators
//!
//! Each function takes a handler and returns a new one that adds behaviour
//! before or after delegating. None of them can fail; the inner response,
//! status included, passes through untouched apart from the headers named.

use hyper::body::Body as _;
use hyper::header::{HeaderMap, CACHE_CONTROL, IF_MODIFIED_SINCE, IF_NONE_MATCH};
use std::sync::Arc;
use std::time::Instant;

use super::{handler_fn, Handler};
use crate::http::CacheMode;
use crate::logger::{AccessLogEntry, AccessSink};

/// Defeat client and intermediary caching
///
/// Strips the revalidation headers (`If-Modified-Since`, `If-None-Match`)
/// and `Cache-Control` from the request so the file server never answers
/// 304, and marks every response `Cache-Control: no-cache`.
pub fn with_no_cache(inner: Handler) -> Handler {
    with_cache_control(inner, CacheMode::NoCache, strip_conditional_headers)
}

/// Mark every response `Cache-Control: max-age=<secs>`
pub fn with_max_age(inner: Handler, secs: u32) -> Handler {
    with_cache_control(inner, CacheMode::MaxAge(secs), |_| {})
}

fn with_cache_control(
    inner: Handler,
    mode: CacheMode,
    prepare: fn(&mut HeaderMap),
) -> Handler {
    let Some(value) = mode.header_value() else {
        return inner;
    };

    handler_fn(move |mut req| {
        let inner = Arc::clone(&inner);
        let value = value.clone();
        async move {
            prepare(req.headers_mut());
            let mut response = inner(req).await;
            response.headers_mut().insert(CACHE_CONTROL, value);
            response
        }
    })
}

fn strip_conditional_headers(headers: &mut HeaderMap) {
    headers.remove(IF_MODIFIED_SINCE);
    headers.remove(IF_NONE_MATCH);
    headers.remove(CACHE_CONTROL);
}

/// Report each request to `sink` once the inner chain has produced a response
///
/// The entry carries the request URI, the elapsed wall-clock time and the
/// status of the response actually returned, so error statuses from the file
/// server are reported as-is.
pub fn with_logging(inner: Handler, sink: AccessSink) -> Handler {
    handler_fn(move |req| {
        let inner = Arc::clone(&inner);
        let sink = Arc::clone(&sink);
        async move {
            let start = Instant::now();
            let mut entry = AccessLogEntry::from_request(&req);

            let response = inner(req).await;

            let body_bytes = response.body().size_hint().exact().unwrap_or(0);
            entry.finish(response.status(), body_bytes, start.elapsed());
            sink(&entry);
            response
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LogSettings, Settings};
    use crate::handler::build_chain;
    use crate::http::{build_404_response, Body};
    use hyper::body::Bytes;
    use hyper::{Request, Response, StatusCode};
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Base handler answering 200 and recording the request headers it saw
    fn recording_base(seen: Arc<Mutex<Vec<HeaderMap>>>) -> Handler {
        handler_fn(move |req: Request<()>| {
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().unwrap().push(req.headers().clone());
                Response::new(Body::new(Bytes::from_static(b"hello")))
            }
        })
    }

    fn settings(cache: CacheMode, verbose: bool) -> Settings {
        Settings {
            address: "127.0.0.1".to_string(),
            port: 0,
            verbose,
            cache,
            root: PathBuf::from("."),
            index_files: vec!["index.html".to_string()],
            keep_alive: true,
            workers: None,
            log: LogSettings::default(),
        }
    }

    fn conditional_request() -> Request<()> {
        Request::get("/page.html")
            .header("If-Modified-Since", "Fri, 01 Jan 2100 00:00:00 GMT")
            .header("Cache-Control", "max-age=0")
            .header("If-None-Match", "\"abc\"")
            .body(())
            .unwrap()
    }

    #[tokio::test]
    async fn test_no_cache_strips_request_headers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let chain = with_no_cache(recording_base(Arc::clone(&seen)));

        let response = chain(conditional_request()).await;
        assert_eq!(response.headers()[CACHE_CONTROL], "no-cache");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(!seen[0].contains_key(IF_MODIFIED_SINCE));
        assert!(!seen[0].contains_key(CACHE_CONTROL));
        assert!(!seen[0].contains_key(IF_NONE_MATCH));
    }

    #[tokio::test]
    async fn test_no_cache_defeats_etag_revalidation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        let mut settings = settings(CacheMode::NoCache, false);
        settings.root = dir.path().to_path_buf();
        let chain = crate::handler::build(&settings);

        let first = chain(Request::get("/a.txt").body(()).unwrap()).await;
        assert_eq!(first.status(), StatusCode::OK);
        let etag = first.headers()["etag"].clone();

        let revalidate = Request::get("/a.txt")
            .header(IF_NONE_MATCH, etag)
            .body(())
            .unwrap();
        let second = chain(revalidate).await;
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(second.headers()[CACHE_CONTROL], "no-cache");
    }

    #[tokio::test]
    async fn test_max_age_sets_header_and_keeps_request() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let chain = with_max_age(recording_base(Arc::clone(&seen)), 30);

        let response = chain(conditional_request()).await;
        assert_eq!(response.headers()[CACHE_CONTROL], "max-age=30");
        assert!(seen.lock().unwrap()[0].contains_key(IF_MODIFIED_SINCE));
    }

    #[tokio::test]
    async fn test_cache_headers_on_error_responses() {
        let base = handler_fn(|_req: Request<()>| async { build_404_response() });
        let response = with_max_age(base, 60)(Request::get("/x").body(()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CACHE_CONTROL], "max-age=60");
    }

    #[tokio::test]
    async fn test_disabled_chain_adds_nothing() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let chain = build_chain(recording_base(Arc::clone(&seen)), &settings(CacheMode::Disabled, false));

        let response = chain(conditional_request()).await;
        assert!(!response.headers().contains_key(CACHE_CONTROL));
        assert!(seen.lock().unwrap()[0].contains_key(IF_MODIFIED_SINCE));
    }

    #[tokio::test]
    async fn test_logging_reports_inner_status_once() {
        let entries = Arc::new(Mutex::new(Vec::new()));
        let sink: AccessSink = {
            let entries = Arc::clone(&entries);
            Arc::new(move |entry: &AccessLogEntry| entries.lock().unwrap().push(entry.clone()))
        };
        let base = handler_fn(|_req: Request<()>| async { build_404_response() });
        let chain = with_logging(with_no_cache(base), sink);

        let response = chain(Request::get("/missing.txt?x=1").body(()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let entries = entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].uri, "/missing.txt?x=1");
        assert_eq!(entries[0].status, 404);
        assert!(entries[0].body_bytes > 0);
    }

    #[tokio::test]
    async fn test_logging_reports_implicit_ok() {
        let entries = Arc::new(Mutex::new(Vec::new()));
        let sink: AccessSink = {
            let entries = Arc::clone(&entries);
            Arc::new(move |entry: &AccessLogEntry| entries.lock().unwrap().push(entry.status))
        };
        // Response::new never sets a status explicitly
        let base = handler_fn(|_req: Request<()>| async { Response::new(Body::new(Bytes::new())) });

        with_logging(base, sink)(Request::get("/").body(()).unwrap()).await;
        assert_eq!(*entries.lock().unwrap(), vec![200]);
    }
}
