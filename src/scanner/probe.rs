//! TCP port probing.
//!
//! A probe is a single connection attempt with a bounded wait: a completed
//! connection means open; refusal, unreachable, and timeout all mean not
//! open. Transient network conditions are outcomes here, never errors.

use crate::banner;
use crate::types::Port;
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Default wait for a TCP connection attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Default wait for a banner response.
pub const DEFAULT_BANNER_TIMEOUT: Duration = Duration::from_secs(2);

/// Probing seam consumed by the scan engine.
///
/// Abstracting the prober keeps the engine testable against stub
/// implementations with deterministic port maps.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Check whether `port` on `host` accepts a TCP connection.
    async fn probe(&self, host: Ipv4Addr, port: Port) -> bool;

    /// Best-effort banner grab on a port already found open.
    async fn grab_banner(&self, host: Ipv4Addr, port: Port) -> Option<String>;
}

/// Production prober using the operating system's connect().
///
/// Does not require elevated privileges. Each probe uses its own
/// connection, released as soon as the outcome is known.
pub struct TcpProber {
    connect_timeout: Duration,
    banner_timeout: Duration,
}

impl TcpProber {
    pub fn new(connect_timeout: Duration, banner_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            banner_timeout,
        }
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT, DEFAULT_BANNER_TIMEOUT)
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, host: Ipv4Addr, port: Port) -> bool {
        let addr = SocketAddr::new(IpAddr::V4(host), port.as_u16());
        // The stream drops the moment the outcome is known, releasing the
        // socket on every exit path.
        matches!(
            timeout(self.connect_timeout, TcpStream::connect(addr)).await,
            Ok(Ok(_))
        )
    }

    async fn grab_banner(&self, host: Ipv4Addr, port: Port) -> Option<String> {
        let addr = SocketAddr::new(IpAddr::V4(host), port.as_u16());
        banner::grab_banner(addr, self.banner_timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_probe_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();

        let prober = TcpProber::default();
        assert!(prober.probe(Ipv4Addr::LOCALHOST, port).await);
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        // Bind then drop so the port is very likely closed.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(listener.local_addr().unwrap().port()).unwrap();
        drop(listener);

        let prober = TcpProber::new(Duration::from_millis(200), Duration::from_millis(200));
        assert!(!prober.probe(Ipv4Addr::LOCALHOST, port).await);
    }
}
