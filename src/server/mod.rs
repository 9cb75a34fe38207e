// Server module entry point
// Binds the listener, announces it and runs the accept loop

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module gets another name
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::{create_listener, resolve_addr};
pub use server_loop::run_accept_loop;

use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::error::ServerError;
use crate::handler::{self, Handler};
use crate::logger;

/// A bound server, ready to accept connections
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    chain: Handler,
    keep_alive: bool,
}

impl Server {
    /// Resolve and bind the configured address and build the handler chain
    pub async fn bind(settings: &Settings) -> Result<Self, ServerError> {
        let addr = resolve_addr(&settings.address, settings.port).await?;
        let listener = create_listener(addr)?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            local_addr,
            chain: handler::build(settings),
            keep_alive: settings.keep_alive,
        })
    }

    /// Address actually bound (differs from the configured one for port 0)
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until `shutdown` resolves
    pub async fn serve<S>(self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        run_accept_loop(self.listener, self.chain, self.keep_alive, shutdown).await;
    }
}

/// Bind, print the startup line and serve until SIGINT/SIGTERM
pub async fn run(settings: Settings) -> Result<(), ServerError> {
    let server = Server::bind(&settings).await?;
    logger::log_server_start(&settings.root, &settings.display_url(server.local_addr().port()));
    server.serve(signal::shutdown_signal()).await;
    Ok(())
}
