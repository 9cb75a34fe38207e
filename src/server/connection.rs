// Connection handling module
// Serves one accepted TCP connection with the handler chain on its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use std::convert::Infallible;
use std::net::SocketAddr;
use tokio::net::TcpStream;

use crate::handler::Handler;
use crate::logger::{self, RemoteAddr};

/// Spawn a task serving HTTP/1.1 on `stream` until the peer goes away
///
/// Each request is stripped of its body (only GET, HEAD and OPTIONS are
/// served) and tagged with the peer address before entering the chain.
/// The connection is registered with `graceful` so shutdown can drain it.
pub fn spawn_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    chain: Handler,
    keep_alive: bool,
    graceful: &GracefulShutdown,
) {
    let io = TokioIo::new(stream);

    let service = service_fn(move |req: Request<hyper::body::Incoming>| {
        let chain = Handler::clone(&chain);
        async move {
            let (mut parts, _body) = req.into_parts();
            parts.extensions.insert(RemoteAddr(peer_addr));
            Ok::<_, Infallible>(chain(Request::from_parts(parts, ())).await)
        }
    });

    let mut builder = http1::Builder::new();
    builder.keep_alive(keep_alive);
    let conn = graceful.watch(builder.serve_connection(io, service));

    tokio::spawn(async move {
        if let Err(err) = conn.await {
            // Peers hanging up mid-request are routine; only report real failures
            if !err.is_incomplete_message() {
                logger::log_connection_error(&err);
            }
        }
    });
}
