//! Banner grabbing for open TCP ports.
//!
//! Opens a fresh connection, sends a minimal HTTP-style greeting, and reads
//! whatever the service answers with. Strictly best-effort: any error,
//! timeout, or empty response collapses to `None` and never aborts the
//! caller's scan.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Maximum bytes to read for a banner.
const MAX_BANNER_SIZE: usize = 1024;

/// Grab a banner from a port the caller already established is open.
///
/// The connection is closed on every exit path (the stream drops as soon
/// as this function returns).
pub async fn grab_banner(addr: SocketAddr, wait: Duration) -> Option<String> {
    let mut stream = timeout(wait, TcpStream::connect(addr)).await.ok()?.ok()?;

    // Many services answer an HTTP request line with either a real banner
    // or an error that still identifies them.
    let greeting = format!("GET / HTTP/1.0\r\nHost: {}\r\n\r\n", addr.ip());
    stream.write_all(greeting.as_bytes()).await.ok()?;

    let mut buffer = vec![0u8; MAX_BANNER_SIZE];
    let n = timeout(wait, stream.read(&mut buffer)).await.ok()?.ok()?;

    decode_banner(&buffer[..n])
}

/// Decode and trim raw banner bytes; empty responses collapse to `None`.
fn decode_banner(data: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(data).trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
