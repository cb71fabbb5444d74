//! # probekit - Concurrent TCP Reachability Probes
//!
//! probekit is a small, best-effort network diagnostic library and CLI built
//! around one primitive: attempt a TCP connection with a deadline and
//! classify how it ended.
//!
//! ## Features
//!
//! - **Port sweeps**: lenient port-range parsing and batched TCP connect
//!   scans with a ceiling on in-flight attempts
//! - **Proxy checks**: connect to `host:port`, send an HTTP proxy-style GET
//!   and classify the reply
//! - **Subnet math**: network, broadcast, usable range and host count from
//!   IPv4 CIDR notation
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use probekit::{compute_subnet, probe_proxy, scan_ports};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let report = scan_ports("192.168.1.1", "22,80,443").await?;
//!     println!("open: {:?} ({} ms)", report.open_ports, report.elapsed_ms);
//!
//!     let proxy = probe_proxy("192.168.1.1:3128").await?;
//!     println!("{}: {}", proxy.classification, proxy.hint);
//!
//!     let subnet = compute_subnet("192.168.1.0/24")?;
//!     println!("{} - {}", subnet.first, subnet.last);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - `Port`, `PortSet` (range parser) and `ProxyTarget`
//! - [`scanner`] - the `Prober` trait, TCP connect probe and batched scanner
//! - [`proxy`] - proxy reachability classifier
//! - [`subnet`] - IPv4 subnet calculator
//! - [`config`] - settings file handling
//! - [`error`] - error types
//! - [`output`] - plain, JSON and CSV rendering

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod proxy;
pub mod scanner;
pub mod subnet;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ConfigError, InputError};
pub use proxy::{probe_proxy, ProxyClassification, ProxyProbeResult, ProxyProber};
pub use scanner::{scan_ports, PortScanner, ProbeOutcome, Prober, ScanReport, Scheduling};
pub use subnet::{compute_subnet, PointToPointPolicy, SubnetInfo};
pub use types::{Port, PortSet, ProxyTarget};

/// Expand a port specification into ascending, deduplicated port numbers.
pub fn parse_range(spec: &str) -> Vec<u16> {
    PortSet::parse(spec).to_u16_vec()
}
