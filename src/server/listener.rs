// Listener module
// Resolves the configured address and creates the TCP listener

use socket2::{Domain, Protocol, Socket, Type};
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;

use crate::error::ServerError;

/// Pending connection queue length
const BACKLOG: i32 = 1024;

/// Resolve `address:port` to one socket address
///
/// Host names go through the system resolver and IPv4 results are preferred.
/// An empty address means every interface.
pub async fn resolve_addr(address: &str, port: u16) -> Result<SocketAddr, ServerError> {
    if address.is_empty() {
        return Ok(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)));
    }

    let host = address.trim_start_matches('[').trim_end_matches(']');
    let candidates: Vec<SocketAddr> = tokio::net::lookup_host((host, port))
        .await
        .map_err(|_| ServerError::Resolve(address.to_string()))?
        .collect();

    candidates
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| candidates.first())
        .copied()
        .ok_or_else(|| ServerError::Resolve(address.to_string()))
}

/// Create a `TcpListener` with `SO_REUSEADDR` enabled.
///
/// `SO_REUSEADDR` lets a restarted server bind a port whose previous
/// connections are still in `TIME_WAIT`.
pub fn create_listener(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    let bind = || -> std::io::Result<TcpListener> {
        let domain = if addr.is_ipv4() {
            Domain::IPV4
        } else {
            Domain::IPV6
        };

        let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket.set_nonblocking(true)?;
        socket.bind(&addr.into())?;
        socket.listen(BACKLOG)?;

        // socket2::Socket -> std::net::TcpListener -> tokio::net::TcpListener
        let std_listener: std::net::TcpListener = socket.into();
        TcpListener::from_std(std_listener)
    };

    bind().map_err(|source| ServerError::Bind { addr, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_ip_literal() {
        let addr = resolve_addr("127.0.0.1", 8080).await.unwrap();
        assert_eq!(addr, "127.0.0.1:8080".parse().unwrap());

        let addr = resolve_addr("[::1]", 80).await.unwrap();
        assert_eq!(addr, "[::1]:80".parse().unwrap());
    }

    #[tokio::test]
    async fn test_resolve_empty_means_all_interfaces() {
        let addr = resolve_addr("", 9000).await.unwrap();
        assert_eq!(addr, "0.0.0.0:9000".parse().unwrap());
    }

    #[tokio::test]
    async fn test_bind_conflict_is_reported() {
        let first = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let taken = first.local_addr().unwrap();
        let second = create_listener(taken);
        assert!(matches!(second, Err(ServerError::Bind { .. })));
    }
}
