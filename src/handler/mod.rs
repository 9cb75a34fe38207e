//! Request handler module
//!
//! A [`Handler`] turns a request into a response. Decorators in
//! [`middleware`] take a handler and return a new one, so the optional
//! behaviours (request logging, cache headers) compose around the file
//! server in an order fixed at startup.

pub mod middleware;
pub mod static_files;

pub use middleware::{with_logging, with_max_age, with_no_cache};
pub use static_files::FileServer;

use hyper::{Request, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::config::{CacheMode, Settings};
use crate::http::Body;
use crate::logger;

pub type ResponseFuture = Pin<Box<dyn Future<Output = Response<Body>> + Send>>;

/// Shared request handler; cloning is cheap
///
/// Requests carry no body: only GET, HEAD and OPTIONS are served.
pub type Handler = Arc<dyn Fn(Request<()>) -> ResponseFuture + Send + Sync>;

/// Wrap an async function as a [`Handler`]
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(Request<()>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response<Body>> + Send + 'static,
{
    Arc::new(move |req| Box::pin(f(req)))
}

/// Compose the handler chain for `settings` around `base`
///
/// Innermost to outermost: `base`, then the no-cache or max-age decorator
/// (at most one, chosen here rather than per request), then request logging.
pub fn build_chain(base: Handler, settings: &Settings) -> Handler {
    let mut chain = match settings.cache {
        CacheMode::Disabled => base,
        CacheMode::NoCache => with_no_cache(base),
        CacheMode::MaxAge(secs) => with_max_age(base, secs),
    };

    if settings.verbose {
        chain = with_logging(chain, logger::access_sink(settings.log.format));
    }

    chain
}

/// Build the full chain serving `settings.root`
pub fn build(settings: &Settings) -> Handler {
    let files = FileServer::new(settings.root.clone(), settings.index_files.clone());
    build_chain(files.into_handler(), settings)
}
