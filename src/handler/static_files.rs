//! Static file serving module
//!
//! The base handler of every chain: resolves request paths under a root
//! directory and serves files, index pages and directory listings with
//! validators, conditional GET and single byte-range support.

use hyper::body::Bytes;
use hyper::header::RANGE;
use hyper::{Method, Request, Response};
use std::fmt::Write as _;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

use super::{handler_fn, Handler};
use crate::http::{self, cache, mime, response, Body, RangeOutcome, Validators};
use crate::logger;

/// Requests for this page are redirected to the directory itself
const INDEX_PAGE: &str = "/index.html";

/// Request path is not valid UTF-8 after decoding, or contains NUL
#[derive(Debug, PartialEq, Eq)]
struct InvalidPath;

/// Serves files below `root`
#[derive(Debug, Clone)]
pub struct FileServer {
    root: PathBuf,
    index_files: Vec<String>,
}

impl FileServer {
    pub fn new(root: impl Into<PathBuf>, index_files: Vec<String>) -> Self {
        Self {
            root: root.into(),
            index_files,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Turn this server into the innermost [`Handler`] of a chain
    pub fn into_handler(self) -> Handler {
        let server = Arc::new(self);
        handler_fn(move |req| {
            let server = Arc::clone(&server);
            async move { server.serve(&req).await }
        })
    }

    /// Answer one request
    pub async fn serve(&self, req: &Request<()>) -> Response<Body> {
        let is_head = match *req.method() {
            Method::GET => false,
            Method::HEAD => true,
            Method::OPTIONS => return http::build_options_response(),
            _ => return http::build_405_response(),
        };

        let decoded = match decode_path(req.uri().path()) {
            Ok(p) => p,
            Err(_) => return http::build_400_response(),
        };

        if decoded.ends_with(INDEX_PAGE) {
            return redirect(req, "./");
        }

        let Ok(segments) = clean_segments(&decoded) else {
            return http::build_400_response();
        };

        let fs_path = segments.iter().fold(self.root.clone(), |p, s| p.join(s));
        let meta = match fs::metadata(&fs_path).await {
            Ok(m) => m,
            Err(e) => return error_response(&e, &fs_path),
        };

        let trailing_slash = decoded.ends_with('/');
        let last = segments.last().copied().unwrap_or_default();

        if meta.is_dir() {
            if !trailing_slash {
                return redirect(req, &format!("{}/", urlencoding::encode(last)));
            }
            if let Some((index_path, index_meta)) = self.find_index(&fs_path).await {
                return serve_file(req, &index_path, &index_meta, is_head).await;
            }
            return serve_listing(req, &fs_path, &meta, is_head).await;
        }

        if trailing_slash {
            return redirect(req, &format!("../{}", urlencoding::encode(last)));
        }

        serve_file(req, &fs_path, &meta, is_head).await
    }

    async fn find_index(&self, dir: &Path) -> Option<(PathBuf, Metadata)> {
        for name in &self.index_files {
            let candidate = dir.join(name);
            if let Ok(meta) = fs::metadata(&candidate).await {
                if meta.is_file() {
                    return Some((candidate, meta));
                }
            }
        }
        None
    }
}

/// Percent-decode the request path
fn decode_path(raw: &str) -> Result<String, InvalidPath> {
    let decoded = urlencoding::decode(raw).map_err(|_| InvalidPath)?;
    if decoded.contains('\0') {
        return Err(InvalidPath);
    }
    Ok(decoded.into_owned())
}

/// Resolve `.` and `..` lexically; `..` at the root stays at the root
fn clean_segments(path: &str) -> Result<Vec<&str>, InvalidPath> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s if s.contains('\\') && cfg!(windows) => return Err(InvalidPath),
            s => segments.push(s),
        }
    }
    Ok(segments)
}

/// Relative redirect that keeps the query string
fn redirect(req: &Request<()>, location: &str) -> Response<Body> {
    match req.uri().query() {
        Some(q) if !q.is_empty() => http::build_redirect_response(&format!("{location}?{q}")),
        _ => http::build_redirect_response(location),
    }
}

/// Map filesystem errors onto statuses
fn error_response(err: &io::Error, path: &Path) -> Response<Body> {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => http::build_404_response(),
        io::ErrorKind::PermissionDenied => http::build_403_response(),
        _ => {
            logger::log_error(&format!("Failed to access '{}': {err}", path.display()));
            http::build_500_response()
        }
    }
}

async fn serve_file(req: &Request<()>, path: &Path, meta: &Metadata, is_head: bool) -> Response<Body> {
    let data = match fs::read(path).await {
        Ok(d) => Bytes::from(d),
        Err(e) => return error_response(&e, path),
    };

    let validators = Validators {
        etag: Some(cache::generate_etag(&data)),
        last_modified: meta.modified().ok(),
    };

    if cache::is_not_modified(req.headers(), validators.etag.as_deref(), validators.last_modified) {
        return http::build_304_response(&validators);
    }

    let content_type = mime::content_type(path, &data);
    let range_header = req.headers().get(RANGE).and_then(|v| v.to_str().ok());

    match http::parse_range_header(range_header, data.len() as u64) {
        RangeOutcome::Full => response::build_file_response(data, content_type, &validators, is_head),
        RangeOutcome::Partial(range) => {
            response::build_partial_response(&data, range, content_type, &validators, is_head)
        }
        RangeOutcome::Unsatisfiable => http::build_416_response(data.len() as u64),
    }
}

async fn serve_listing(req: &Request<()>, dir: &Path, meta: &Metadata, is_head: bool) -> Response<Body> {
    let validators = Validators {
        etag: None,
        last_modified: meta.modified().ok(),
    };
    if cache::is_not_modified(req.headers(), None, validators.last_modified) {
        return http::build_304_response(&validators);
    }

    let entries = match read_entries(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            logger::log_error(&format!("Failed to read directory '{}': {e}", dir.display()));
            return http::build_500_response();
        }
    };

    response::build_html_response(render_listing(&entries), &validators, is_head)
}

/// Directory entries as `(name, is_dir)`, sorted by name
async fn read_entries(dir: &Path) -> io::Result<Vec<(String, bool)>> {
    let mut reader = fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir());
        entries.push((entry.file_name().to_string_lossy().into_owned(), is_dir));
    }
    entries.sort();
    Ok(entries)
}

fn render_listing(entries: &[(String, bool)]) -> String {
    let mut html = String::from(
        "<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n",
    );
    for (name, is_dir) in entries {
        let suffix = if *is_dir { "/" } else { "" };
        let _ = writeln!(
            html,
            "<a href=\"{}{suffix}\">{}{suffix}</a>",
            urlencoding::encode(name),
            escape_html(name),
        );
    }
    html.push_str("</pre>\n");
    html
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
