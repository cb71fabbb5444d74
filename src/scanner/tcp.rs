//! TCP connect probe.
//!
//! Performs a full TCP handshake through the operating system's socket API.
//! No elevated privileges are required.

use crate::scanner::traits::{ConnectEvent, ProbeOutcome, Prober};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Default per-port deadline used by sweeps.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(600);

/// Attempt one TCP connection, bounded by `deadline`.
///
/// Connect, timeout and error race inside a single future, so the caller
/// receives exactly one event. On timeout the pending socket is dropped
/// together with the connect future.
pub async fn connect_with_deadline(addr: SocketAddr, deadline: Duration) -> ConnectEvent {
    match timeout(deadline, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => ConnectEvent::Connected(stream),
        Ok(Err(e)) => ConnectEvent::Failed(e),
        Err(_) => ConnectEvent::TimedOut,
    }
}

/// Prober that performs a TCP connect and immediately closes on success.
#[derive(Debug, Clone)]
pub struct TcpConnectProber {
    timeout: Duration,
}

impl TcpConnectProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpConnectProber {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl Prober for TcpConnectProber {
    async fn probe(&self, addr: SocketAddr) -> ProbeOutcome {
        let event = connect_with_deadline(addr, self.timeout).await;
        match &event {
            ConnectEvent::Connected(_) => debug!(%addr, "connected"),
            ConnectEvent::TimedOut => debug!(%addr, "timed out"),
            ConnectEvent::Failed(e) => debug!(%addr, error = %e, "connect failed"),
        }
        event.into_outcome()
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
