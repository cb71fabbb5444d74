//! Scanner module - batched TCP connect sweeps over one host.
//!
//! Ports are probed with bounded concurrency on the current task: no threads
//! are spawned, the ceiling applies to outstanding connection attempts.

pub mod tcp;
pub mod traits;

use crate::error::InputResult;
use crate::types::{resolve_host, validate_host, Port, PortSet};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub use tcp::{connect_with_deadline, TcpConnectProber, DEFAULT_CONNECT_TIMEOUT};
pub use traits::{ConnectEvent, ProbeOutcome, Prober};

/// Maximum number of connection attempts in flight at once.
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// How probes are scheduled under the concurrency ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Scheduling {
    /// Consecutive batches; a batch starts only after the previous one has
    /// fully settled.
    #[default]
    Batched,
    /// Sliding window: a new attempt starts as soon as any other finishes.
    Windowed,
}

impl fmt::Display for Scheduling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Batched => write!(f, "batched"),
            Self::Windowed => write!(f, "windowed"),
        }
    }
}

/// Result of sweeping one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Host as given by the caller.
    pub host: String,
    /// Address actually probed, if the host resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<IpAddr>,
    /// Number of connection attempts made.
    pub ports_scanned: usize,
    /// Open ports, strictly ascending.
    pub open_ports: Vec<u16>,
    /// Wall-clock time from parsing to the last settled attempt.
    pub elapsed_ms: u64,
}

impl ScanReport {
    fn empty(host: &str) -> Self {
        Self {
            host: host.to_string(),
            address: None,
            ports_scanned: 0,
            open_ports: Vec::new(),
            elapsed_ms: 0,
        }
    }
}

/// Batched port scanner.
///
/// # Example
///
/// ```ignore
/// let report = PortScanner::new().scan("192.168.1.1", "22,80,443").await?;
/// println!("open: {:?} in {} ms", report.open_ports, report.elapsed_ms);
/// ```
pub struct PortScanner<P = TcpConnectProber> {
    prober: P,
    batch_size: usize,
    scheduling: Scheduling,
    progress: Option<ProgressBar>,
}

impl PortScanner<TcpConnectProber> {
    /// Scanner with a 600 ms deadline per port and batches of 200.
    pub fn new() -> Self {
        Self::with_prober(TcpConnectProber::default())
    }

    /// Replace the per-port deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.prober = TcpConnectProber::new(timeout);
        self
    }
}

impl Default for PortScanner<TcpConnectProber> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Prober> PortScanner<P> {
    /// Build a scanner around any prober.
    pub fn with_prober(prober: P) -> Self {
        Self {
            prober,
            batch_size: DEFAULT_BATCH_SIZE,
            scheduling: Scheduling::default(),
            progress: None,
        }
    }

    /// Set the in-flight ceiling (at least 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_scheduling(mut self, scheduling: Scheduling) -> Self {
        self.scheduling = scheduling;
        self
    }

    /// Report each settled attempt to a progress bar.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Sweep `host` over the ports described by `range_spec`.
    ///
    /// Only an empty host is an error. An empty port set returns immediately
    /// without touching the network, and a host that fails to resolve yields
    /// a report with no open ports.
    pub async fn scan(&self, host: &str, range_spec: &str) -> InputResult<ScanReport> {
        let start = Instant::now();
        let host = validate_host(host)?;

        let ports = PortSet::parse(range_spec);
        if ports.is_empty() {
            debug!(host, range_spec, "empty port set, nothing to scan");
            return Ok(ScanReport::empty(host));
        }

        let ip = match resolve_host(host).await {
            Ok(ip) => ip,
            Err(reason) => {
                warn!(host, %reason, "host did not resolve, no ports probed");
                return Ok(ScanReport {
                    elapsed_ms: elapsed_ms(start),
                    ..ScanReport::empty(host)
                });
            }
        };

        info!(
            host,
            %ip,
            ports = %ports,
            count = ports.len(),
            scheduling = %self.scheduling,
            "starting scan"
        );

        let open = self.scan_address(ip, &ports).await;
        let report = ScanReport {
            host: host.to_string(),
            address: Some(ip),
            ports_scanned: ports.len(),
            open_ports: open.into_iter().map(Port::as_u16).collect(),
            elapsed_ms: elapsed_ms(start),
        };

        info!(
            host,
            open = report.open_ports.len(),
            elapsed_ms = report.elapsed_ms,
            "scan complete"
        );
        Ok(report)
    }

    /// Probe every port of `ports` on an already-resolved address.
    ///
    /// Returns the open ports in ascending order regardless of the order in
    /// which attempts settled.
    pub async fn scan_address(&self, ip: IpAddr, ports: &PortSet) -> Vec<Port> {
        match self.scheduling {
            Scheduling::Batched => self.sweep_batched(ip, ports).await,
            Scheduling::Windowed => self.sweep_windowed(ip, ports).await,
        }
    }

    async fn sweep_batched(&self, ip: IpAddr, ports: &PortSet) -> Vec<Port> {
        let mut open = Vec::new();

        for (index, batch) in ports.as_slice().chunks(self.batch_size).enumerate() {
            debug!(batch = index, size = batch.len(), "starting batch");

            // join_all yields outcomes in input order, so `open` stays ascending
            let outcomes = join_all(batch.iter().map(|&port| self.probe_one(ip, port))).await;
            open.extend(
                batch
                    .iter()
                    .zip(outcomes)
                    .filter(|(_, outcome)| outcome.is_open())
                    .map(|(&port, _)| port),
            );
        }

        open
    }

    async fn sweep_windowed(&self, ip: IpAddr, ports: &PortSet) -> Vec<Port> {
        // buffer_unordered keeps at most batch_size attempts outstanding
        let mut open: Vec<Port> = stream::iter(ports.iter())
            .map(|port| async move { (port, self.probe_one(ip, port).await) })
            .buffer_unordered(self.batch_size)
            .filter_map(|(port, outcome)| async move { outcome.is_open().then_some(port) })
            .collect()
            .await;

        open.sort_unstable();
        open
    }

    /// Probe one port, treating a prober that overruns its own deadline as closed.
    async fn probe_one(&self, ip: IpAddr, port: Port) -> ProbeOutcome {
        let addr = SocketAddr::new(ip, port.as_u16());
        let attempt = self.prober.probe(addr);
        let outcome = match tokio::time::timeout(self.prober.timeout(), attempt).await {
            Ok(outcome) => outcome,
            Err(_) => {
                debug!(%addr, "prober overran its deadline");
                ProbeOutcome::Closed
            }
        };

        if let Some(ref pb) = self.progress {
            pb.inc(1);
            if outcome.is_open() {
                pb.set_message(format!("found open port {}", port));
            }
        }

        outcome
    }
}

/// Sweep `host` with the default 600 ms deadline and batches of 200.
pub async fn scan_ports(host: &str, range_spec: &str) -> InputResult<ScanReport> {
    PortScanner::new().scan(host, range_spec).await
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputError;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Prober with scripted latency that records how attempts overlapped.
    struct ScriptedProber {
        open: HashSet<u16>,
        delay: fn(u16) -> Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        settled: AtomicUsize,
        /// (port, attempts settled when this one started)
        starts: Mutex<Vec<(u16, usize)>>,
    }

    impl ScriptedProber {
        fn new(open: &[u16], delay: fn(u16) -> Duration) -> Self {
            Self {
                open: open.iter().copied().collect(),
                delay,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                settled: AtomicUsize::new(0),
                starts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.starts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Prober for ScriptedProber {
        async fn probe(&self, addr: SocketAddr) -> ProbeOutcome {
            let port = addr.port();
            self.starts
                .lock()
                .unwrap()
                .push((port, self.settled.load(Ordering::SeqCst)));
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep((self.delay)(port)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.settled.fetch_add(1, Ordering::SeqCst);
            if self.open.contains(&port) {
                ProbeOutcome::Open
            } else {
                ProbeOutcome::Closed
            }
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(100)
        }
    }

    fn reversed(port: u16) -> Duration {
        Duration::from_millis(u64::from(40 - port.min(40)))
    }

    fn fixed(_: u16) -> Duration {
        Duration::from_millis(2)
    }

    fn hang(_: u16) -> Duration {
        Duration::from_secs(30)
    }

    #[tokio::test]
    async fn test_open_ports_ascending_despite_reversed_completion() {
        for scheduling in [Scheduling::Batched, Scheduling::Windowed] {
            let scanner = PortScanner::with_prober(ScriptedProber::new(&[20, 5, 35, 10], reversed))
                .with_batch_size(8)
                .with_scheduling(scheduling);

            let report = scanner.scan("127.0.0.1", "1-40").await.unwrap();
            assert_eq!(report.open_ports, vec![5, 10, 20, 35], "{scheduling}");
            assert_eq!(report.ports_scanned, 40);
        }
    }

    #[tokio::test]
    async fn test_batches_run_strictly_in_sequence() {
        let scanner = PortScanner::with_prober(ScriptedProber::new(&[], fixed));
        scanner.scan("127.0.0.1", "1-450").await.unwrap();

        let prober = scanner.prober();
        assert_eq!(prober.max_in_flight.load(Ordering::SeqCst), DEFAULT_BATCH_SIZE);
        for &(port, settled_before) in prober.starts.lock().unwrap().iter() {
            let batch = usize::from(port - 1) / DEFAULT_BATCH_SIZE;
            assert!(
                settled_before >= batch * DEFAULT_BATCH_SIZE,
                "port {port} started before batch {batch} was reached"
            );
        }
    }

    #[tokio::test]
    async fn test_windowed_respects_ceiling() {
        let scanner = PortScanner::with_prober(ScriptedProber::new(&[], fixed))
            .with_batch_size(16)
            .with_scheduling(Scheduling::Windowed);
        scanner.scan("127.0.0.1", "1-100").await.unwrap();

        let max = scanner.prober().max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 16, "max in flight was {max}");
        assert_eq!(scanner.prober().calls(), 100);
    }

    #[tokio::test]
    async fn test_empty_port_set_short_circuits() {
        let scanner = PortScanner::with_prober(ScriptedProber::new(&[], fixed));
        let report = scanner.scan("127.0.0.1", "abc,0,70000").await.unwrap();

        assert!(report.open_ports.is_empty());
        assert_eq!(report.elapsed_ms, 0);
        assert_eq!(report.ports_scanned, 0);
        assert_eq!(scanner.prober().calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_host_is_rejected() {
        let scanner = PortScanner::with_prober(ScriptedProber::new(&[], fixed));
        assert_eq!(
            scanner.scan("  ", "80").await,
            Err(InputError::EmptyHost)
        );
        assert_eq!(scanner.prober().calls(), 0);
    }

    #[tokio::test]
    async fn test_hung_prober_is_cut_off_at_its_timeout() {
        let scanner = PortScanner::with_prober(ScriptedProber::new(&[1, 2], hang));

        let started = Instant::now();
        let report = scanner.scan("127.0.0.1", "1-3").await.unwrap();

        assert!(report.open_ports.is_empty());
        assert_eq!(report.ports_scanned, 3);
        assert!(started.elapsed() < Duration::from_secs(2), "{:?}", started.elapsed());
    }

    #[tokio::test]
    async fn test_unbounded_window_does_not_panic() {
        let scanner = PortScanner::with_prober(ScriptedProber::new(&[3], fixed))
            .with_batch_size(usize::MAX)
            .with_scheduling(Scheduling::Windowed);

        let report = scanner.scan("127.0.0.1", "1-5").await.unwrap();
        assert_eq!(report.open_ports, vec![3]);
        assert_eq!(scanner.prober().calls(), 5);
    }

    #[test]
    fn test_batch_size_floor() {
        let scanner = PortScanner::new().with_batch_size(0);
        assert_eq!(scanner.batch_size(), 1);
    }

    #[test]
    fn test_report_serialization() {
        let report = ScanReport {
            open_ports: vec![22, 80],
            elapsed_ms: 12,
            ..ScanReport::empty("localhost")
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["open_ports"], serde_json::json!([22, 80]));
        assert_eq!(json["elapsed_ms"], 12);
        assert!(json.get("address").is_none());
    }
}
