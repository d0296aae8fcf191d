//! Discovered-host record produced by the ARP sweep.

use pnet::util::MacAddr;
use std::fmt;
use std::net::Ipv4Addr;

/// A live host that answered discovery.
///
/// One record per responding address; never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveredHost {
    /// Network address the host answered from.
    pub ip: Ipv4Addr,
    /// Hardware address taken from the discovery reply.
    pub mac: MacAddr,
}

impl DiscoveredHost {
    pub fn new(ip: Ipv4Addr, mac: MacAddr) -> Self {
        Self { ip, mac }
    }
}

impl fmt::Display for DiscoveredHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.ip, self.mac)
    }
}
