//! ARP host discovery.
//!
//! Broadcasts one ARP who-has request per address in the target range over
//! a datalink channel, then collects replies for a fixed window. Hosts are
//! identified by the network and hardware addresses in their reply.
//!
//! # Privileges Required
//!
//! Opening the datalink channel needs raw socket access (root/sudo on
//! Unix, administrator on Windows). This is a deployment constraint; the
//! failure is surfaced as a distinct permission error rather than an
//! empty sweep.

use crate::error::{ScanError, ScanResult};
use crate::types::{DiscoveredHost, NetworkRange};
use async_trait::async_trait;
use pnet::datalink::{self, Channel, Config, NetworkInterface};
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket, MutableEthernetPacket};
use pnet::packet::Packet;
use pnet::util::MacAddr;
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default window to collect discovery replies.
pub const DEFAULT_DISCOVERY_WINDOW: Duration = Duration::from_secs(1);

const ETH_HEADER_LEN: usize = 14;
const ARP_PACKET_LEN: usize = 28;
/// Minimum ethernet frame length without the trailing checksum.
const MIN_FRAME_LEN: usize = 60;
/// Short read timeout so the reply loop can observe its deadline.
const CHANNEL_READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Discovery seam consumed by the scan engine.
#[async_trait]
pub trait Discover: Send + Sync {
    /// Enumerate live hosts on `range`.
    ///
    /// An unanswered sweep is an empty list, not an error.
    async fn discover(&self, range: &NetworkRange) -> ScanResult<Vec<DiscoveredHost>>;
}

/// Production discovery via a broadcast ARP sweep.
pub struct ArpDiscovery {
    window: Duration,
    interface: Option<String>,
}

impl ArpDiscovery {
    /// Create a discovery with the given reply-collection window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            interface: None,
        }
    }

    /// Pin discovery to a named interface instead of autodetecting one.
    pub fn with_interface(mut self, name: impl Into<String>) -> Self {
        self.interface = Some(name.into());
        self
    }
}

impl Default for ArpDiscovery {
    fn default() -> Self {
        Self::new(DEFAULT_DISCOVERY_WINDOW)
    }
}

#[async_trait]
impl Discover for ArpDiscovery {
    async fn discover(&self, range: &NetworkRange) -> ScanResult<Vec<DiscoveredHost>> {
        let range = *range;
        let window = self.window;
        let interface = self.interface.clone();

        // pnet datalink I/O is blocking; keep it off the async workers.
        tokio::task::spawn_blocking(move || arp_sweep(range, window, interface.as_deref()))
            .await
            .map_err(|e| ScanError::Channel(format!("discovery task failed: {e}")))?
    }
}

/// Send one ARP request per address, then drain replies until the window
/// closes. Replies are deduplicated by address.
fn arp_sweep(
    range: NetworkRange,
    window: Duration,
    interface_name: Option<&str>,
) -> ScanResult<Vec<DiscoveredHost>> {
    let interface = find_interface(interface_name)?;
    let source_mac = interface.mac.ok_or_else(|| {
        ScanError::Channel(format!("interface {} has no MAC address", interface.name))
    })?;
    let source_ip = interface_ipv4(&interface)?;

    let config = Config {
        read_timeout: Some(CHANNEL_READ_TIMEOUT),
        ..Default::default()
    };
    let (mut tx, mut rx) = match datalink::channel(&interface, config) {
        Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
        Ok(_) => {
            return Err(ScanError::Channel(format!(
                "non-ethernet channel on {}",
                interface.name
            )))
        }
        Err(e) => {
            let err_str = e.to_string().to_lowercase();
            if err_str.contains("permission") || err_str.contains("operation not permitted") {
                return Err(ScanError::PermissionDenied(
                    "ARP discovery requires root/administrator privileges".to_string(),
                ));
            }
            return Err(ScanError::Channel(e.to_string()));
        }
    };

    for target in range.hosts() {
        let request = build_arp_request(source_mac, source_ip, target)?;
        if let Some(Err(e)) = tx.send_to(&request, None) {
            debug!(target = %target, error = %e, "failed to send ARP request");
        }
    }

    let mut hosts = Vec::new();
    let mut seen = HashSet::new();
    let deadline = Instant::now() + window;
    while Instant::now() < deadline {
        // Read timeouts just mean no traffic arrived in this slice.
        let frame = match rx.next() {
            Ok(frame) => frame,
            Err(_) => continue,
        };
        if let Some(host) = parse_arp_reply(frame, &range) {
            if seen.insert(host.ip) {
                debug!(host = %host, "host responded");
                hosts.push(host);
            }
        }
    }

    Ok(hosts)
}

/// Build a broadcast ARP who-has frame for `target`.
fn build_arp_request(
    source_mac: MacAddr,
    source_ip: Ipv4Addr,
    target: Ipv4Addr,
) -> ScanResult<Vec<u8>> {
    let mut buffer = vec![0u8; MIN_FRAME_LEN];

    {
        let mut ethernet = MutableEthernetPacket::new(&mut buffer)
            .ok_or_else(|| ScanError::InvalidPacket("ethernet header".to_string()))?;
        ethernet.set_destination(MacAddr::broadcast());
        ethernet.set_source(source_mac);
        ethernet.set_ethertype(EtherTypes::Arp);
    }

    let mut arp = MutableArpPacket::new(&mut buffer[ETH_HEADER_LEN..ETH_HEADER_LEN + ARP_PACKET_LEN])
        .ok_or_else(|| ScanError::InvalidPacket("arp payload".to_string()))?;
    arp.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp.set_protocol_type(EtherTypes::Ipv4);
    arp.set_hw_addr_len(6);
    arp.set_proto_addr_len(4);
    arp.set_operation(ArpOperations::Request);
    arp.set_sender_hw_addr(source_mac);
    arp.set_sender_proto_addr(source_ip);
    arp.set_target_hw_addr(MacAddr::zero());
    arp.set_target_proto_addr(target);

    Ok(buffer)
}

/// Extract a discovered host from an ARP reply inside the target range.
///
/// Anything else (other ethertypes, requests, out-of-range senders) is
/// ignored.
fn parse_arp_reply(frame: &[u8], range: &NetworkRange) -> Option<DiscoveredHost> {
    let ethernet = EthernetPacket::new(frame)?;
    if ethernet.get_ethertype() != EtherTypes::Arp {
        return None;
    }

    let arp = ArpPacket::new(ethernet.payload())?;
    if arp.get_operation() != ArpOperations::Reply {
        return None;
    }

    let ip = arp.get_sender_proto_addr();
    if !range.contains(ip) {
        return None;
    }

    Some(DiscoveredHost::new(ip, arp.get_sender_hw_addr()))
}

fn find_interface(name: Option<&str>) -> ScanResult<NetworkInterface> {
    let interfaces = datalink::interfaces();
    match name {
        Some(name) => interfaces
            .into_iter()
            .find(|iface| iface.name == name)
            .ok_or_else(|| ScanError::InterfaceNotFound(name.to_string())),
        None => interfaces
            .into_iter()
            .find(|iface| iface.is_up() && !iface.is_loopback() && iface.ips.iter().any(|ip| ip.is_ipv4()))
            .ok_or(ScanError::NoInterface),
    }
}

fn interface_ipv4(interface: &NetworkInterface) -> ScanResult<Ipv4Addr> {
    interface
        .ips
        .iter()
        .find_map(|ip| match ip {
            ipnetwork::IpNetwork::V4(net) => Some(net.ip()),
            _ => None,
        })
        .ok_or_else(|| {
            ScanError::Channel(format!("interface {} has no IPv4 address", interface.name))
        })
}
