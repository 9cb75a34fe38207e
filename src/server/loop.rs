// Server loop module
// Accepts connections until shutdown, then drains the ones still open

use hyper_util::server::graceful::GracefulShutdown;
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::spawn_connection;
use crate::handler::Handler;
use crate::logger;

/// How long open connections get to finish after shutdown is requested
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Accept connections on `listener` and serve each with `chain`
///
/// Returns after `shutdown` resolves and open connections have drained
/// (or `DRAIN_TIMEOUT` has passed).
pub async fn run_accept_loop<S>(listener: TcpListener, chain: Handler, keep_alive: bool, shutdown: S)
where
    S: Future<Output = ()>,
{
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        spawn_connection(stream, peer_addr, Handler::clone(&chain), keep_alive, &graceful);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => break,
        }
    }

    // Stop accepting before waiting on the stragglers
    drop(listener);

    tokio::select! {
        () = graceful.shutdown() => {}
        () = tokio::time::sleep(DRAIN_TIMEOUT) => {
            logger::log_warning(&format!(
                "Connections still open after {}s, closing them",
                DRAIN_TIMEOUT.as_secs()
            ));
        }
    }
}
