//! HTTP protocol layer module
//!
//! Protocol-level helpers shared by the file server and the decorators:
//! caching validators, MIME detection, range parsing and response builders.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

use http_body_util::Full;
use hyper::body::Bytes;

/// Response body type used across the server
pub type Body = Full<Bytes>;

// Re-export commonly used types
pub use cache::CacheMode;
pub use range::{parse_range_header, ByteRange, RangeOutcome};
pub use response::{
    build_304_response, build_400_response, build_403_response, build_404_response,
    build_405_response, build_416_response, build_500_response, build_options_response,
    build_redirect_response, Validators,
};
