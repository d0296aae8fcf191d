//! Scan orchestration engine.
//!
//! Drives the full pipeline: host discovery, per-host concurrent port
//! sweeps with banner collection, result aggregation, critical-port
//! classification, and handoff to the scan log writer.
//!
//! Concurrency exists across hosts, not across ports: one task owns one
//! host's entire sequential sweep, and a semaphore caps how many host
//! tasks run at once. Completed host results are drained by a single
//! collecting loop, so the result set is never touched by two tasks.

pub mod probe;

pub use probe::{Prober, TcpProber};

use crate::alerts;
use crate::discovery::Discover;
use crate::error::ScanResult;
use crate::storage::ScanLogWriter;
use crate::types::{NetworkRange, Port};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

/// Default cap on simultaneously running host tasks.
pub const DEFAULT_CONCURRENCY: usize = 50;

/// How many host futures may sit queued on the stream; the semaphore
/// controls actual concurrency.
const MAX_PENDING_TASKS: usize = 1000;

/// Outcome recorded for one open port.
#[derive(Debug, Clone, Serialize)]
pub struct PortOutcome {
    /// The open port.
    pub port: Port,
    /// Banner captured from the service; absent when the grab failed or
    /// the service sent nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

/// Open ports found on a single host, keyed by port number.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct HostResult {
    open_ports: BTreeMap<Port, PortOutcome>,
}

impl HostResult {
    /// Record an open port. Port numbers are unique within one host.
    pub fn record(&mut self, port: Port, banner: Option<String>) {
        self.open_ports.insert(port, PortOutcome { port, banner });
    }

    pub fn is_empty(&self) -> bool {
        self.open_ports.is_empty()
    }

    pub fn len(&self) -> usize {
        self.open_ports.len()
    }

    pub fn get(&self, port: Port) -> Option<&PortOutcome> {
        self.open_ports.get(&port)
    }

    /// Iterate outcomes in ascending port order.
    pub fn iter(&self) -> impl Iterator<Item = &PortOutcome> {
        self.open_ports.values()
    }
}

/// Completed scan: hosts with at least one open port, keyed by address.
///
/// Hosts that answered discovery but exposed nothing are deliberately
/// absent; downstream consumers (log writer, alerting) depend on that.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ScanResultSet {
    hosts: BTreeMap<Ipv4Addr, HostResult>,
}

impl ScanResultSet {
    pub fn insert(&mut self, host: Ipv4Addr, result: HostResult) {
        self.hosts.insert(host, result);
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn get(&self, host: &Ipv4Addr) -> Option<&HostResult> {
        self.hosts.get(host)
    }

    pub fn contains(&self, host: &Ipv4Addr) -> bool {
        self.hosts.contains_key(host)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ipv4Addr, &HostResult)> {
        self.hosts.iter()
    }
}

/// Advisory events emitted while a scan runs.
///
/// These carry no control semantics; dropping the receiver never affects
/// the scan.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// Human-readable progress message.
    Status(String),
    /// An open port was merged into the result set.
    PortOpen {
        host: Ipv4Addr,
        port: Port,
        banner: Option<String>,
    },
    /// An open port matched the critical-port table.
    CriticalFinding {
        host: Ipv4Addr,
        port: Port,
        reason: &'static str,
    },
    /// All host tasks have completed.
    Finished,
}

/// The scan orchestrator.
///
/// Generic over its discovery and probing seams so tests can drive it
/// with deterministic stubs.
pub struct ScanEngine<D, P> {
    discovery: D,
    prober: Arc<P>,
    ports: Vec<Port>,
    concurrency: usize,
    events: Option<mpsc::UnboundedSender<ScanEvent>>,
    log_writer: Option<ScanLogWriter>,
    progress: bool,
}

impl<D, P> ScanEngine<D, P>
where
    D: Discover,
    P: Prober + 'static,
{
    /// Assemble an engine from its parts.
    pub fn with_parts(discovery: D, prober: P, mut ports: Vec<Port>) -> Self {
        // Ports are probed in ascending order within each host.
        ports.sort_unstable();
        ports.dedup();
        Self {
            discovery,
            prober: Arc::new(prober),
            ports,
            concurrency: DEFAULT_CONCURRENCY,
            events: None,
            log_writer: None,
            progress: false,
        }
    }

    /// Cap on simultaneous host tasks.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Attach an advisory event channel.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<ScanEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Persist a scan log once the sweep completes.
    pub fn with_log_writer(mut self, writer: ScanLogWriter) -> Self {
        self.log_writer = Some(writer);
        self
    }

    /// Show a per-host progress bar while scanning.
    pub fn with_progress(mut self) -> Self {
        self.progress = true;
        self
    }

    /// Run a complete scan against a textual range specification.
    ///
    /// Malformed ranges fail here, before any traffic is sent.
    pub async fn run_scan(&self, range: &str) -> ScanResult<ScanResultSet> {
        let range = NetworkRange::parse(range)?;
        self.scan(&range).await
    }

    /// Run a complete scan: discovery, concurrent host sweeps,
    /// aggregation, classification, and log handoff.
    pub async fn scan(&self, range: &NetworkRange) -> ScanResult<ScanResultSet> {
        self.emit(ScanEvent::Status(format!("Discovering hosts on {range}...")));

        let hosts = self.discovery.discover(range).await?;
        let mut results = ScanResultSet::default();

        if hosts.is_empty() {
            // Nothing answered; no tasks are scheduled and no log written.
            self.emit(ScanEvent::Status("No active hosts found.".to_string()));
            self.emit(ScanEvent::Finished);
            return Ok(results);
        }

        self.emit(ScanEvent::Status(format!(
            "Found {} active hosts, sweeping {} ports on each...",
            hosts.len(),
            self.ports.len()
        )));

        let progress = self.progress.then(|| {
            let pb = ProgressBar::new(hosts.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} hosts {msg}")
                    .unwrap()
                    .progress_chars("=>-"),
            );
            pb
        });

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut outcomes = stream::iter(hosts)
            .map(|host| {
                let semaphore = Arc::clone(&semaphore);
                let prober = Arc::clone(&self.prober);
                let ports = self.ports.clone();
                async move {
                    let permit = semaphore
                        .acquire_owned()
                        .await
                        .expect("semaphore is never closed");
                    // One task per host: a failing host must not take the
                    // rest of the scan down with it.
                    let task = tokio::spawn(async move {
                        let _permit = permit;
                        sweep_host(prober.as_ref(), host.ip, &ports).await
                    });
                    (host, task.await)
                }
            })
            .buffer_unordered(MAX_PENDING_TASKS);

        while let Some((host, joined)) = outcomes.next().await {
            if let Some(pb) = &progress {
                pb.inc(1);
            }
            match joined {
                Ok(result) => {
                    if result.is_empty() {
                        debug!(host = %host.ip, "no open ports");
                        continue;
                    }
                    if let Some(pb) = &progress {
                        pb.set_message(format!("{}: {} open", host.ip, result.len()));
                    }
                    self.report(host.ip, &result);
                    results.insert(host.ip, result);
                }
                Err(err) => {
                    warn!(host = %host.ip, error = %err, "host task failed, skipping host");
                }
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message("scan complete");
        }

        if let Some(writer) = &self.log_writer {
            match writer.save(&results) {
                Ok(Some(path)) => self.emit(ScanEvent::Status(format!(
                    "Scan log saved to {}",
                    path.display()
                ))),
                Ok(None) => {}
                Err(err) => {
                    // Persistence failure never costs the caller their
                    // in-memory results.
                    warn!(error = %err, "could not save scan log");
                    self.emit(ScanEvent::Status(format!("Could not save scan log: {err}")));
                }
            }
        }

        self.emit(ScanEvent::Finished);
        Ok(results)
    }

    /// Emit per-outcome events for a merged host result: one PortOpen per
    /// open port, plus one CriticalFinding per table match.
    fn report(&self, host: Ipv4Addr, result: &HostResult) {
        for outcome in result.iter() {
            self.emit(ScanEvent::PortOpen {
                host,
                port: outcome.port,
                banner: outcome.banner.clone(),
            });
            if let Some(reason) = alerts::classify(outcome.port) {
                self.emit(ScanEvent::CriticalFinding {
                    host,
                    port: outcome.port,
                    reason,
                });
            }
        }
    }

    fn emit(&self, event: ScanEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

/// Sequential sweep of one host's port space.
///
/// Ports are probed one at a time in ascending order; each open port gets
/// an immediate best-effort banner grab. Closed ports are never followed
/// up on.
async fn sweep_host<P: Prober>(prober: &P, host: Ipv4Addr, ports: &[Port]) -> HostResult {
    let mut result = HostResult::default();
    for &port in ports {
        if prober.probe(host, port).await {
            let banner = prober.grab_banner(host, port).await;
            result.record(port, banner);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanResult;
    use crate::types::DiscoveredHost;
    use async_trait::async_trait;
    use pnet::util::MacAddr;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn port(n: u16) -> Port {
        Port::new(n).unwrap()
    }

    fn host(s: &str) -> DiscoveredHost {
        DiscoveredHost::new(s.parse().unwrap(), MacAddr::zero())
    }

    struct StubDiscovery {
        hosts: Vec<DiscoveredHost>,
    }

    #[async_trait]
    impl Discover for StubDiscovery {
        async fn discover(&self, _range: &NetworkRange) -> ScanResult<Vec<DiscoveredHost>> {
            Ok(self.hosts.clone())
        }
    }

    /// Prober backed by a fixed map of open ports, counting every call.
    struct StubProber {
        open: HashMap<(Ipv4Addr, u16), Option<String>>,
        probes: Arc<AtomicUsize>,
        banner_grabs: Arc<AtomicUsize>,
    }

    impl StubProber {
        fn new(open: HashMap<(Ipv4Addr, u16), Option<String>>) -> Self {
            Self {
                open,
                probes: Arc::new(AtomicUsize::new(0)),
                banner_grabs: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Prober for StubProber {
        async fn probe(&self, host: Ipv4Addr, port: Port) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.open.contains_key(&(host, port.as_u16()))
        }

        async fn grab_banner(&self, host: Ipv4Addr, port: Port) -> Option<String> {
            self.banner_grabs.fetch_add(1, Ordering::SeqCst);
            self.open.get(&(host, port.as_u16())).cloned().flatten()
        }
    }

    #[tokio::test]
    async fn test_empty_discovery_short_circuits() {
        let prober = StubProber::new(HashMap::new());
        let probes = Arc::clone(&prober.probes);

        let engine = ScanEngine::with_parts(
            StubDiscovery { hosts: vec![] },
            prober,
            vec![port(22), port(80)],
        );
        let results = engine.run_scan("192.168.1.0/24").await.unwrap();

        assert!(results.is_empty());
        assert_eq!(probes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_range_fails_before_discovery() {
        let engine = ScanEngine::with_parts(
            StubDiscovery { hosts: vec![] },
            StubProber::new(HashMap::new()),
            vec![port(22)],
        );
        assert!(engine.run_scan("bogus/range").await.is_err());
    }

    #[tokio::test]
    async fn test_host_without_open_ports_is_omitted() {
        let a: Ipv4Addr = "10.0.0.1".parse().unwrap();
        let b: Ipv4Addr = "10.0.0.2".parse().unwrap();

        let mut open = HashMap::new();
        open.insert((a, 22), Some("SSH-2.0-OpenSSH".to_string()));
        let prober = StubProber::new(open);

        let engine = ScanEngine::with_parts(
            StubDiscovery {
                hosts: vec![host("10.0.0.1"), host("10.0.0.2")],
            },
            prober,
            vec![port(22), port(80)],
        );
        let results = engine.run_scan("10.0.0.0/24").await.unwrap();

        assert_eq!(results.len(), 1);
        assert!(results.contains(&a));
        assert!(!results.contains(&b));
        let outcome = results.get(&a).unwrap().get(port(22)).unwrap();
        assert_eq!(outcome.banner.as_deref(), Some("SSH-2.0-OpenSSH"));
    }

    #[tokio::test]
    async fn test_closed_port_never_gets_banner_grab() {
        let c: Ipv4Addr = "10.0.0.3".parse().unwrap();
        let mut open = HashMap::new();
        open.insert((c, 22), None);
        let prober = StubProber::new(open);
        let grabs = Arc::clone(&prober.banner_grabs);

        let engine = ScanEngine::with_parts(
            StubDiscovery {
                hosts: vec![host("10.0.0.3")],
            },
            prober,
            vec![port(22), port(80)],
        );
        let results = engine.run_scan("10.0.0.0/24").await.unwrap();

        // Port 80 was probed closed: no banner attempt, no record.
        assert_eq!(grabs.load(Ordering::SeqCst), 1);
        let result = results.get(&c).unwrap();
        assert!(result.get(port(80)).is_none());
        // The open port stays recorded even though its banner is absent.
        assert!(result.get(port(22)).unwrap().banner.is_none());
    }

    #[tokio::test]
    async fn test_critical_finding_emitted_exactly_once() {
        let a: Ipv4Addr = "10.0.0.1".parse().unwrap();
        let mut open = HashMap::new();
        open.insert((a, 23), None);
        open.insert((a, 80), Some("nginx".to_string()));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let engine = ScanEngine::with_parts(
            StubDiscovery {
                hosts: vec![host("10.0.0.1")],
            },
            StubProber::new(open),
            vec![port(23), port(80)],
        )
        .with_events(tx);

        engine.run_scan("10.0.0.0/24").await.unwrap();

        let mut criticals = Vec::new();
        let mut finished = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                ScanEvent::CriticalFinding { host, port, reason } => {
                    criticals.push((host, port, reason))
                }
                ScanEvent::Finished => finished = true,
                _ => {}
            }
        }

        assert!(finished);
        assert_eq!(
            criticals,
            vec![(a, port(23), "Telnet (Unencrypted remote login)")]
        );
    }

    /// Prober that tracks how many probes run at the same time.
    struct SlowProber {
        current: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Prober for SlowProber {
        async fn probe(&self, _host: Ipv4Addr, _port: Port) -> bool {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            false
        }

        async fn grab_banner(&self, _host: Ipv4Addr, _port: Port) -> Option<String> {
            None
        }
    }

    #[tokio::test]
    async fn test_concurrency_stays_within_limit() {
        let peak = Arc::new(AtomicUsize::new(0));
        let prober = SlowProber {
            current: Arc::new(AtomicUsize::new(0)),
            peak: Arc::clone(&peak),
        };

        let hosts: Vec<DiscoveredHost> = (1..=8)
            .map(|n| host(&format!("10.0.0.{n}")))
            .collect();

        let engine = ScanEngine::with_parts(StubDiscovery { hosts }, prober, vec![port(22)])
            .with_concurrency(2);
        engine.run_scan("10.0.0.0/24").await.unwrap();

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    /// Prober that panics for one specific host.
    struct PanickyProber {
        poison: Ipv4Addr,
    }

    #[async_trait]
    impl Prober for PanickyProber {
        async fn probe(&self, host: Ipv4Addr, _port: Port) -> bool {
            if host == self.poison {
                panic!("prober blew up on {host}");
            }
            true
        }

        async fn grab_banner(&self, _host: Ipv4Addr, _port: Port) -> Option<String> {
            Some("fine".to_string())
        }
    }

    #[tokio::test]
    async fn test_failing_host_does_not_abort_the_scan() {
        let healthy: Ipv4Addr = "10.0.0.1".parse().unwrap();
        let poison: Ipv4Addr = "10.0.0.9".parse().unwrap();

        let engine = ScanEngine::with_parts(
            StubDiscovery {
                hosts: vec![host("10.0.0.9"), host("10.0.0.1")],
            },
            PanickyProber { poison },
            vec![port(80)],
        );
        let results = engine.run_scan("10.0.0.0/24").await.unwrap();

        assert!(results.contains(&healthy));
        assert!(!results.contains(&poison));
    }
}
