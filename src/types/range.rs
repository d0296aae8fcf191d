//! Network range specification with CIDR support.
//!
//! A `NetworkRange` is the validated IPv4 address space a scan sweeps.
//! Parsing rejects malformed input before any traffic is sent; iteration
//! skips the network and broadcast addresses.

use ipnetwork::Ipv4Network;
use pnet::datalink;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Error type for range parsing and validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RangeError {
    #[error("invalid network range '{0}': expected CIDR notation such as 192.168.1.0/24")]
    InvalidCidr(String),

    #[error("network range too large: {0} addresses (max: {1})")]
    TooLarge(u64, u64),
}

/// A validated IPv4 network range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkRange(Ipv4Network);

impl NetworkRange {
    /// Maximum number of addresses allowed in a range (a /16).
    pub const MAX_ADDRESSES: u64 = 65536;

    /// Parse a range from CIDR notation. A bare address sweeps itself.
    pub fn parse(s: &str) -> Result<Self, RangeError> {
        let s = s.trim();

        if let Ok(addr) = s.parse::<Ipv4Addr>() {
            let network =
                Ipv4Network::new(addr, 32).map_err(|_| RangeError::InvalidCidr(s.to_string()))?;
            return Ok(Self(network));
        }

        let network: Ipv4Network = s.parse().map_err(|_| RangeError::InvalidCidr(s.to_string()))?;
        if u64::from(network.size()) > Self::MAX_ADDRESSES {
            return Err(RangeError::TooLarge(
                u64::from(network.size()),
                Self::MAX_ADDRESSES,
            ));
        }

        Ok(Self(network))
    }

    /// Detect the local network range from the first up, non-loopback
    /// interface carrying an IPv4 address.
    pub fn detect_local() -> Option<Self> {
        datalink::interfaces()
            .iter()
            .filter(|iface| iface.is_up() && !iface.is_loopback())
            .flat_map(|iface| iface.ips.iter())
            .find_map(|ip| match ip {
                ipnetwork::IpNetwork::V4(net) if !net.ip().is_loopback() => {
                    Ipv4Network::new(net.network(), net.prefix()).ok().map(Self)
                }
                _ => None,
            })
    }

    /// Check whether an address falls inside this range.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.0.contains(addr)
    }

    /// Iterate the sweepable addresses, excluding the network and
    /// broadcast addresses for prefixes shorter than /31.
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> {
        let net = self.0;
        net.iter().filter(move |addr| {
            if net.prefix() >= 31 {
                return true;
            }
            *addr != net.network() && *addr != net.broadcast()
        })
    }

    /// Number of sweepable addresses in this range.
    pub fn host_count(&self) -> u64 {
        let size = u64::from(self.0.size());
        if self.0.prefix() >= 31 {
            size
        } else {
            size.saturating_sub(2)
        }
    }
}

impl FromStr for NetworkRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NetworkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cidr() {
        let range = NetworkRange::parse("192.168.1.0/24").unwrap();
        assert_eq!(range.host_count(), 254);
        assert!(range.contains("192.168.1.42".parse().unwrap()));
        assert!(!range.contains("192.168.2.1".parse().unwrap()));
    }

    #[test]
    fn test_parse_bare_address_is_slash_32() {
        let range = NetworkRange::parse("10.0.0.5").unwrap();
        let hosts: Vec<Ipv4Addr> = range.hosts().collect();
        assert_eq!(hosts, vec!["10.0.0.5".parse::<Ipv4Addr>().unwrap()]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            NetworkRange::parse("not-a-range"),
            Err(RangeError::InvalidCidr(_))
        ));
        assert!(matches!(
            NetworkRange::parse("192.168.1.0/33"),
            Err(RangeError::InvalidCidr(_))
        ));
    }

    #[test]
    fn test_parse_rejects_oversized_range() {
        assert!(matches!(
            NetworkRange::parse("10.0.0.0/8"),
            Err(RangeError::TooLarge(_, _))
        ));
    }

    #[test]
    fn test_hosts_skip_network_and_broadcast() {
        let range = NetworkRange::parse("192.168.1.0/30").unwrap();
        let hosts: Vec<Ipv4Addr> = range.hosts().collect();
        assert_eq!(
            hosts,
            vec![
                "192.168.1.1".parse::<Ipv4Addr>().unwrap(),
                "192.168.1.2".parse::<Ipv4Addr>().unwrap(),
            ]
        );
    }

    #[test]
    fn test_slash_31_keeps_both_addresses() {
        let range = NetworkRange::parse("192.168.1.0/31").unwrap();
        assert_eq!(range.hosts().count(), 2);
    }
}
