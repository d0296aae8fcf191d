//! # netwarden - A Local Network Sentinel
//!
//! netwarden sweeps a network range for live hosts, audits each host's
//! TCP port space, collects service banners, and flags high-risk
//! exposures. It also ships the small protective collaborators those
//! findings feed: a hosts-file domain blocker and a firewall IP blocker.
//!
//! ## Features
//!
//! - **ARP Host Discovery**: broadcast sweep of a CIDR range, collecting
//!   responding network and hardware addresses
//! - **Concurrent Port Auditing**: bounded worker pool across hosts, with
//!   each host's port space swept sequentially
//! - **Banner Grabbing**: best-effort service identification on open ports
//! - **Critical-Port Alerting**: static risk classification of exposures
//!   like Telnet, SMB, and RDP
//! - **Scan Logs**: one timestamped text file per completed scan
//! - **Blocking**: hosts-file domain blocking and firewall IP blocking
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use netwarden::discovery::ArpDiscovery;
//! use netwarden::scanner::{ScanEngine, TcpProber};
//! use netwarden::types::PortSpec;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ports = PortSpec::default().to_ports();
//!     let engine = ScanEngine::with_parts(
//!         ArpDiscovery::default(),
//!         TcpProber::default(),
//!         ports,
//!     );
//!
//!     let results = engine.run_scan("192.168.1.0/24").await.unwrap();
//!     for (host, result) in results.iter() {
//!         println!("{host}: {} open ports", result.len());
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`types`] - validated ports, ranges, and discovered hosts
//! - [`discovery`] - ARP host discovery
//! - [`scanner`] - port probing and the scan orchestration engine
//! - [`banner`] - best-effort banner collection
//! - [`alerts`] - critical-port classification
//! - [`storage`] - scan log persistence
//! - [`protection`] - hosts-file and firewall blocking collaborators
//! - [`config`] - configuration management
//! - [`error`] - comprehensive error types

pub mod alerts;
pub mod banner;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod output;
pub mod protection;
pub mod scanner;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ScanError};
pub use scanner::{HostResult, PortOutcome, ScanEngine, ScanEvent, ScanResultSet};
pub use types::{DiscoveredHost, NetworkRange, Port, PortSpec};
