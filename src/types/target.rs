//! Target types: `host:port` validation and host resolution.
//!
//! IP literals are used as-is; anything else goes through the system's
//! resolver configuration via `trust-dns-resolver`, falling back to its
//! built-in defaults when that cannot be read.

use crate::error::{InputError, InputResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

use super::Port;

/// A validated `host:port` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyTarget {
    pub host: String,
    pub port: Port,
}

impl ProxyTarget {
    /// Parse `host:port`. The host must be non-empty and the port numeric.
    pub fn parse(s: &str) -> InputResult<Self> {
        let s = s.trim();
        let (host, port) = s
            .split_once(':')
            .ok_or_else(|| InputError::MissingPort(s.to_string()))?;

        let host = validate_host(host)?;
        let port = port
            .trim()
            .parse::<u16>()
            .ok()
            .and_then(Port::new)
            .ok_or_else(|| InputError::InvalidPort(port.to_string()))?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl FromStr for ProxyTarget {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ProxyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Trim a host and reject it if empty.
pub fn validate_host(host: &str) -> InputResult<&str> {
    let host = host.trim();
    if host.is_empty() {
        Err(InputError::EmptyHost)
    } else {
        Ok(host)
    }
}

/// Resolve a hostname or IP address string to a single address.
///
/// The first address returned by the resolver wins. Errors are rendered as
/// strings because a failed lookup is a network outcome, not a caller error.
pub async fn resolve_host(host: &str) -> Result<IpAddr, String> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }

    let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|_| {
        TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
    });

    let response = resolver
        .lookup_ip(host)
        .await
        .map_err(|e| format!("failed to resolve '{}': {}", host, e))?;

    response
        .iter()
        .next()
        .ok_or_else(|| format!("no addresses found for '{}'", host))
}
