//! HTTP proxy reachability check.
//!
//! Connects to a single `host:port`, sends an absolute-URI GET the way a
//! client would through an HTTP proxy, and classifies the first chunk of the
//! reply. The whole exchange shares one deadline.

use crate::error::InputResult;
use crate::scanner::{connect_with_deadline, ConnectEvent};
use crate::types::{resolve_host, ProxyTarget};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info};

/// Default deadline for the whole exchange.
pub const DEFAULT_PROXY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default maximum number of characters kept from the reply.
pub const DEFAULT_SAMPLE_LIMIT: usize = 1000;

/// Request written right after the handshake.
const PROXY_PROBE: &[u8] =
    b"GET http://example.com/ HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\n\r\n";

const HTTP_MARKER: &str = "HTTP/";

const READ_CHUNK: usize = 4096;

/// How the endpoint behaved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyClassification {
    /// Replied with something containing `HTTP/`.
    HttpLike,
    /// Accepted the connection but replied with something else, or closed.
    ConnectedNoHttp,
    /// Connection failed or nothing arrived before the deadline.
    Unreachable,
}

impl ProxyClassification {
    pub fn is_reachable(self) -> bool {
        !matches!(self, Self::Unreachable)
    }
}

impl fmt::Display for ProxyClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpLike => write!(f, "http-like"),
            Self::ConnectedNoHttp => write!(f, "connected, no http"),
            Self::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// Result of one proxy check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyProbeResult {
    pub target: String,
    pub reachable: bool,
    pub classification: ProxyClassification,
    /// Human-readable detail; `"timeout"` when the deadline expired.
    pub hint: String,
    /// Start of the first reply chunk, lossily decoded.
    pub sample: String,
}

impl ProxyProbeResult {
    fn unreachable(target: &ProxyTarget, hint: impl Into<String>) -> Self {
        Self {
            target: target.to_string(),
            reachable: false,
            classification: ProxyClassification::Unreachable,
            hint: hint.into(),
            sample: String::new(),
        }
    }

    fn timed_out(target: &ProxyTarget) -> Self {
        Self::unreachable(target, "timeout")
    }

    /// True when the probe gave up because the deadline expired.
    pub fn is_timeout(&self) -> bool {
        self.classification == ProxyClassification::Unreachable && self.hint == "timeout"
    }
}

/// Configurable proxy checker.
#[derive(Debug, Clone)]
pub struct ProxyProber {
    timeout: Duration,
    sample_limit: usize,
}

impl Default for ProxyProber {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PROXY_TIMEOUT,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }
}

impl ProxyProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_sample_limit(mut self, limit: usize) -> Self {
        self.sample_limit = limit;
        self
    }

    /// Validate `host:port` and probe it.
    ///
    /// Malformed input is returned as an error before any I/O; every network
    /// failure is folded into an `Unreachable` result.
    pub async fn probe(&self, target: &str) -> InputResult<ProxyProbeResult> {
        let target = ProxyTarget::parse(target)?;
        Ok(self.probe_target(&target).await)
    }

    /// Probe an already validated target.
    pub async fn probe_target(&self, target: &ProxyTarget) -> ProxyProbeResult {
        let deadline = Instant::now() + self.timeout;

        let ip = match timeout_at(deadline, resolve_host(&target.host)).await {
            Ok(Ok(ip)) => ip,
            Ok(Err(reason)) => return ProxyProbeResult::unreachable(target, reason),
            Err(_) => return ProxyProbeResult::timed_out(target),
        };
        let addr = SocketAddr::new(ip, target.port.as_u16());

        let remaining = deadline.saturating_duration_since(Instant::now());
        let stream = match connect_with_deadline(addr, remaining).await {
            ConnectEvent::Connected(stream) => stream,
            ConnectEvent::TimedOut => return ProxyProbeResult::timed_out(target),
            ConnectEvent::Failed(e) => {
                debug!(%addr, error = %e, "proxy connect failed");
                return ProxyProbeResult::unreachable(target, e.to_string());
            }
        };

        // Dropping the exchange future on timeout also drops the stream
        let result = match timeout_at(deadline, first_chunk(stream)).await {
            Ok(Ok(chunk)) => self.classify(target, &chunk),
            Ok(Err(e)) => ProxyProbeResult::unreachable(target, e.to_string()),
            Err(_) => ProxyProbeResult::timed_out(target),
        };

        info!(
            proxy = %target,
            classification = %result.classification,
            "proxy check complete"
        );
        result
    }

    fn classify(&self, target: &ProxyTarget, chunk: &[u8]) -> ProxyProbeResult {
        let text = String::from_utf8_lossy(chunk);
        let (classification, hint) = if text.contains(HTTP_MARKER) {
            (
                ProxyClassification::HttpLike,
                "HTTP-like response received (possible proxy/http service)",
            )
        } else {
            (
                ProxyClassification::ConnectedNoHttp,
                "Connected but no HTTP response",
            )
        };

        ProxyProbeResult {
            target: target.to_string(),
            reachable: true,
            classification,
            hint: hint.to_string(),
            sample: text.chars().take(self.sample_limit).collect(),
        }
    }
}

/// Send the probe request and read one chunk. The stream closes on return.
async fn first_chunk(mut stream: TcpStream) -> io::Result<Vec<u8>> {
    stream.write_all(PROXY_PROBE).await?;

    let mut buffer = vec![0u8; READ_CHUNK];
    let n = stream.read(&mut buffer).await?;
    buffer.truncate(n);
    Ok(buffer)
}

/// Check `host:port` with the default 5 s deadline.
pub async fn probe_proxy(target: &str) -> InputResult<ProxyProbeResult> {
    ProxyProber::new().probe(target).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputError;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Accept one connection, capture the request, then write `reply`.
    async fn serve_once(reply: &'static [u8]) -> (String, oneshot::Receiver<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 1024];
            let n = socket.read(&mut request).await.unwrap();
            request.truncate(n);
            let _ = tx.send(request);
            if !reply.is_empty() {
                socket.write_all(reply).await.unwrap();
            }
        });

        (addr.to_string(), rx)
    }

    #[tokio::test]
    async fn test_http_like_response() {
        let (target, request) = serve_once(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n").await;

        let result = probe_proxy(&target).await.unwrap();
        assert_eq!(result.classification, ProxyClassification::HttpLike);
        assert!(result.reachable);
        assert!(result.sample.starts_with("HTTP/1.1 200 OK"));

        let request = request.await.unwrap();
        assert!(request.starts_with(b"GET http://example.com/ HTTP/1.1\r\nHost: example.com\r\n"));
    }

    #[tokio::test]
    async fn test_non_http_response() {
        let (target, _request) = serve_once(b"SSH-2.0-OpenSSH_9.6\r\n").await;

        let result = probe_proxy(&target).await.unwrap();
        assert_eq!(result.classification, ProxyClassification::ConnectedNoHttp);
        assert!(result.reachable);
        assert_eq!(result.sample, "SSH-2.0-OpenSSH_9.6\r\n");
    }

    #[tokio::test]
    async fn test_clean_close_without_reply() {
        let (target, request) = serve_once(b"").await;

        let result = probe_proxy(&target).await.unwrap();
        assert_eq!(result.classification, ProxyClassification::ConnectedNoHttp);
        assert!(result.reachable);
        assert!(result.sample.is_empty());
        assert!(!request.await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sample_is_truncated() {
        let (target, _request) = serve_once(b"HTTP/1.0 403 Forbidden\r\n").await;

        let result = ProxyProber::new()
            .with_sample_limit(8)
            .probe(&target)
            .await
            .unwrap();
        assert_eq!(result.classification, ProxyClassification::HttpLike);
        assert_eq!(result.sample, "HTTP/1.0");
    }

    #[tokio::test]
    async fn test_silent_endpoint_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let target = listener.local_addr().unwrap().to_string();
        let _hold = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let result = ProxyProber::new()
            .with_timeout(Duration::from_millis(200))
            .probe(&target)
            .await
            .unwrap();
        assert_eq!(result.classification, ProxyClassification::Unreachable);
        assert!(!result.reachable);
        assert!(result.is_timeout());
    }

    #[tokio::test]
    async fn test_refused_connection_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let target = listener.local_addr().unwrap().to_string();
        drop(listener);

        let result = probe_proxy(&target).await.unwrap();
        assert_eq!(result.classification, ProxyClassification::Unreachable);
        assert!(!result.reachable);
        assert!(result.sample.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_target_rejected() {
        assert_eq!(
            probe_proxy("bad-target").await,
            Err(InputError::MissingPort("bad-target".into()))
        );
        assert!(matches!(
            probe_proxy("127.0.0.1:abc").await,
            Err(InputError::InvalidPort(_))
        ));
    }
}
