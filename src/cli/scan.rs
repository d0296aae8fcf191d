//! Scan subcommand implementation.

use crate::cli::OutputFormat;
use crate::config::AppSettings;
use crate::discovery::ArpDiscovery;
use crate::error::{CliError, CliResult};
use crate::output;
use crate::scanner::{ScanEngine, ScanEvent, TcpProber};
use crate::storage::ScanLogWriter;
use crate::types::{NetworkRange, PortSpec};
use clap::Parser;
use std::time::Duration;
use tokio::sync::mpsc;

/// Discover hosts on a network range and audit their open ports.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Network range to sweep in CIDR notation (autodetected when omitted)
    ///
    /// Examples:
    ///   192.168.1.0/24     A whole subnet
    ///   192.168.1.17       A single address
    #[arg(value_name = "RANGE")]
    pub range: Option<String>,

    /// Ports to sweep on each discovered host (e.g. "22,80,1-1024")
    #[arg(short, long)]
    pub ports: Option<String>,

    /// Maximum number of hosts scanned simultaneously
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// TCP connect timeout in milliseconds
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Banner read timeout in milliseconds
    #[arg(long)]
    pub banner_timeout: Option<u64>,

    /// ARP reply collection window in milliseconds
    #[arg(long)]
    pub window: Option<u64>,

    /// Network interface to send discovery probes on
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,

    /// Skip writing the scan log file
    #[arg(long)]
    pub no_log: bool,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute(&self, verbose: bool, quiet: bool) -> CliResult<()> {
        let settings = AppSettings::load()?;

        let range = match &self.range {
            Some(range) => NetworkRange::parse(range)?,
            None => NetworkRange::detect_local().ok_or_else(|| {
                CliError::Other(
                    "could not autodetect the local network range; pass one explicitly \
                     (e.g. 192.168.1.0/24)"
                        .to_string(),
                )
            })?,
        };

        let spec: PortSpec = self
            .ports
            .as_deref()
            .unwrap_or(settings.ports.as_str())
            .parse()?;
        let ports = spec.to_ports();

        if !is_root() {
            output::print_warning(
                "ARP discovery requires root/sudo privileges; the sweep may find nothing.",
            );
        }

        if !quiet && self.output == OutputFormat::Plain {
            output::print_info(&format!(
                "Scanning {range} ({} ports per host)",
                ports.len()
            ));
        }

        let mut discovery = ArpDiscovery::new(Duration::from_millis(
            self.window.unwrap_or(settings.discovery_window_ms),
        ));
        if let Some(interface) = &self.interface {
            discovery = discovery.with_interface(interface);
        }

        let prober = TcpProber::new(
            Duration::from_millis(self.timeout.unwrap_or(settings.connect_timeout_ms)),
            Duration::from_millis(self.banner_timeout.unwrap_or(settings.banner_timeout_ms)),
        );

        let (events, rx) = mpsc::unbounded_channel();
        let printer = tokio::spawn(drain_events(rx, verbose, quiet));

        let mut engine = ScanEngine::with_parts(discovery, prober, ports)
            .with_concurrency(self.concurrency.unwrap_or(settings.concurrency))
            .with_events(events);
        if settings.auto_save_logs && !self.no_log {
            engine = engine.with_log_writer(ScanLogWriter::new());
        }
        if verbose && self.output == OutputFormat::Plain {
            engine = engine.with_progress();
        }

        let results = engine.scan(&range).await?;

        // Dropping the engine closes the event channel, letting the
        // printer drain out.
        drop(engine);
        let _ = printer.await;

        match self.output {
            OutputFormat::Plain => output::print_results(&results)?,
            OutputFormat::Json => output::print_json(&results)?,
        }

        Ok(())
    }
}

/// Relay advisory scan events to the terminal.
async fn drain_events(mut rx: mpsc::UnboundedReceiver<ScanEvent>, verbose: bool, quiet: bool) {
    while let Some(event) = rx.recv().await {
        match event {
            ScanEvent::Status(message) if verbose && !quiet => output::print_info(&message),
            ScanEvent::CriticalFinding { host, port, reason } if !quiet => {
                output::print_critical(host, port, reason)
            }
            _ => {}
        }
    }
}

/// Check if running with root/admin privileges.
fn is_root() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
