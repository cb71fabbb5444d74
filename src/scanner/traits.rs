//! Prober trait abstraction.
//!
//! A connection attempt ends in exactly one [`ConnectEvent`]. Because the
//! event is the return value of a single future, an attempt cannot complete
//! twice, and any socket it opened is owned by that value and dropped with it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;

/// Terminal event of one connection attempt.
#[derive(Debug)]
pub enum ConnectEvent {
    /// Handshake completed; the caller owns the stream.
    Connected(TcpStream),
    /// The deadline expired before the handshake finished.
    TimedOut,
    /// The attempt failed (refused, reset, unreachable...).
    Failed(io::Error),
}

impl ConnectEvent {
    /// Collapse the event into a scan outcome, closing any open stream.
    pub fn into_outcome(self) -> ProbeOutcome {
        match self {
            Self::Connected(stream) => {
                drop(stream);
                ProbeOutcome::Open
            }
            Self::TimedOut | Self::Failed(_) => ProbeOutcome::Closed,
        }
    }
}

/// Outcome of probing one port.
///
/// Refused and timed-out attempts are both `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeOutcome {
    /// Connection established.
    Open,
    /// Connection refused, failed, or timed out.
    Closed,
}

impl ProbeOutcome {
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Something that can decide whether a single TCP port accepts connections.
///
/// The batched scanner is generic over this trait so that tests can inject
/// probers with artificial latency.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe one address.
    async fn probe(&self, addr: SocketAddr) -> ProbeOutcome;

    /// Per-attempt deadline. The scanner counts an attempt still pending
    /// after this long as closed.
    fn timeout(&self) -> Duration;
}
