//! HTTP response building module
//!
//! Builders for the responses the file server produces. None of them set
//! `Cache-Control`: that header belongs to the cache decorators.

use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::time::SystemTime;

use super::cache::format_http_date;
use super::range::ByteRange;
use super::Body;

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Validators attached to file and directory responses
#[derive(Debug, Clone, Default)]
pub struct Validators {
    pub etag: Option<String>,
    pub last_modified: Option<SystemTime>,
}

impl Validators {
    fn apply(&self, mut builder: hyper::http::response::Builder) -> hyper::http::response::Builder {
        if let Some(etag) = &self.etag {
            builder = builder.header("ETag", etag);
        }
        if let Some(modified) = self.last_modified {
            builder = builder.header("Last-Modified", format_http_date(modified));
        }
        builder
    }
}

fn plain_text(status: StatusCode, message: &'static str) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("X-Content-Type-Options", "nosniff")
        .body(Body::new(Bytes::from_static(message.as_bytes())))
        .unwrap_or_else(|e| fallback(status, &e))
}

pub fn build_400_response() -> Response<Body> {
    plain_text(StatusCode::BAD_REQUEST, "400 Bad Request\n")
}

pub fn build_403_response() -> Response<Body> {
    plain_text(StatusCode::FORBIDDEN, "403 Forbidden\n")
}

pub fn build_404_response() -> Response<Body> {
    plain_text(StatusCode::NOT_FOUND, "404 page not found\n")
}

pub fn build_500_response() -> Response<Body> {
    plain_text(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error\n")
}

pub fn build_405_response() -> Response<Body> {
    let mut response = plain_text(StatusCode::METHOD_NOT_ALLOWED, "405 Method Not Allowed\n");
    response
        .headers_mut()
        .insert("Allow", hyper::header::HeaderValue::from_static(ALLOWED_METHODS));
    response
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<Body> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", ALLOWED_METHODS)
        .body(Body::new(Bytes::new()))
        .unwrap_or_else(|e| fallback(StatusCode::NO_CONTENT, &e))
}

/// Build 301 redirect relative to the current request path
pub fn build_redirect_response(location: &str) -> Response<Body> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header("Location", location)
        .body(Body::new(Bytes::new()))
        .unwrap_or_else(|e| fallback(StatusCode::MOVED_PERMANENTLY, &e))
}

/// Build 304 Not Modified response
pub fn build_304_response(validators: &Validators) -> Response<Body> {
    validators
        .apply(Response::builder().status(StatusCode::NOT_MODIFIED))
        .body(Body::new(Bytes::new()))
        .unwrap_or_else(|e| fallback(StatusCode::NOT_MODIFIED, &e))
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(size: u64) -> Response<Body> {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Range", format!("bytes */{size}"))
        .body(Body::new(Bytes::from_static(b"416 Range Not Satisfiable\n")))
        .unwrap_or_else(|e| fallback(StatusCode::RANGE_NOT_SATISFIABLE, &e))
}

/// Build 200 response for a whole file
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    validators: &Validators,
    is_head: bool,
) -> Response<Body> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    validators
        .apply(Response::builder().status(StatusCode::OK))
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("Accept-Ranges", "bytes")
        .body(Body::new(body))
        .unwrap_or_else(|e| fallback(StatusCode::OK, &e))
}

/// Build 206 Partial Content response; `data` is the whole file
pub fn build_partial_response(
    data: &Bytes,
    range: ByteRange,
    content_type: &str,
    validators: &Validators,
    is_head: bool,
) -> Response<Body> {
    let total = data.len() as u64;
    let body = if is_head {
        Bytes::new()
    } else {
        // Range ends are clamped to the file size by the parser
        #[allow(clippy::cast_possible_truncation)]
        data.slice(range.start as usize..=range.end as usize)
    };

    validators
        .apply(Response::builder().status(StatusCode::PARTIAL_CONTENT))
        .header("Content-Type", content_type)
        .header("Content-Length", range.byte_len())
        .header("Content-Range", range.content_range(total))
        .header("Accept-Ranges", "bytes")
        .body(Body::new(body))
        .unwrap_or_else(|e| fallback(StatusCode::PARTIAL_CONTENT, &e))
}

/// Build generic HTML response
pub fn build_html_response(
    content: String,
    validators: &Validators,
    is_head: bool,
) -> Response<Body> {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    validators
        .apply(Response::builder().status(StatusCode::OK))
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(Body::new(body))
        .unwrap_or_else(|e| fallback(StatusCode::OK, &e))
}

/// Log a response build error and degrade to an empty 500
fn fallback(intended: StatusCode, error: &hyper::http::Error) -> Response<Body> {
    crate::logger::log_error(&format!(
        "Failed to build {} response: {error}",
        intended.as_u16()
    ));
    let mut response = Response::new(Body::new(Bytes::new()));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
