//! Port types with validation and parsing.
//!
//! `Port` is backed by `NonZeroU16`, so the one invalid port number (0)
//! is unrepresentable. `PortSpec` handles sweep specifications like
//! "22,80,8000-9000".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU16;
use std::str::FromStr;

/// A validated network port number (1-65535).
///
/// Niche-optimized: `Option<Port>` is the same size as `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(NonZeroU16);

impl Port {
    /// Create a new Port, rejecting the invalid port 0.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        match NonZeroU16::new(port) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0.get()
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(value))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.as_u16()
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PortError {
    #[error("port must be between 1 and 65535, got {0}")]
    OutOfRange(u16),

    #[error("unparsable port number '{0}'")]
    InvalidFormat(String),

    #[error("descending port range {0}-{1}")]
    InvalidRange(u16, u16),

    #[error("empty port specification")]
    Empty,
}

/// A sweep specification: one or more inclusive port ranges.
///
/// Supports formats like:
/// - Single port: "80"
/// - Comma-separated: "80,443,8080"
/// - Range: "1-1024"
/// - Mixed: "22,80,443,8000-9000"
#[derive(Debug, Clone)]
pub struct PortSpec {
    // (start, end) pairs; start <= end holds for every pair.
    ranges: Vec<(Port, Port)>,
}

impl PortSpec {
    /// Expand to a sorted, deduplicated list of ports.
    pub fn to_ports(&self) -> Vec<Port> {
        let mut ports: Vec<Port> = self
            .ranges
            .iter()
            .flat_map(|&(lo, hi)| (lo.as_u16()..=hi.as_u16()).filter_map(Port::new))
            .collect();
        ports.sort_unstable();
        ports.dedup();
        ports
    }

    /// Number of unique ports the spec expands to.
    pub fn count(&self) -> usize {
        self.to_ports().len()
    }
}

impl Default for PortSpec {
    /// The default sweep space: the well-known service ports 1-1024.
    fn default() -> Self {
        let ranges = Port::new(1)
            .zip(Port::new(1024))
            .map(|pair| vec![pair])
            .unwrap_or_default();
        Self { ranges }
    }
}

impl FromStr for PortSpec {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PortError::Empty);
        }

        let ranges = s
            .split(',')
            .map(|piece| parse_piece(piece.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { ranges })
    }
}

/// Parse one comma-separated piece: either "80" or "8000-9000".
fn parse_piece(piece: &str) -> Result<(Port, Port), PortError> {
    match piece.split_once('-') {
        Some((lo, hi)) => {
            let lo = parse_port(lo)?;
            let hi = parse_port(hi)?;
            if lo > hi {
                return Err(PortError::InvalidRange(lo.as_u16(), hi.as_u16()));
            }
            Ok((lo, hi))
        }
        None => {
            let port = parse_port(piece)?;
            Ok((port, port))
        }
    }
}

fn parse_port(text: &str) -> Result<Port, PortError> {
    let text = text.trim();
    let value: u16 = text
        .parse()
        .map_err(|_| PortError::InvalidFormat(text.to_string()))?;
    Port::new(value).ok_or(PortError::OutOfRange(value))
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (lo, hi)) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if lo == hi {
                write!(f, "{lo}")?;
            } else {
                write!(f, "{lo}-{hi}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_zero_is_unrepresentable() {
        assert!(Port::new(0).is_none());
        assert!(matches!(Port::try_from(0), Err(PortError::OutOfRange(0))));
    }

    #[test]
    fn test_port_roundtrip() {
        for n in [1u16, 80, 1024, 65535] {
            assert_eq!(Port::new(n).map(Port::as_u16), Some(n));
        }
    }

    #[test]
    fn test_port_spec_parsing() {
        assert_eq!("80".parse::<PortSpec>().unwrap().count(), 1);
        assert_eq!("80,443".parse::<PortSpec>().unwrap().count(), 2);
        assert_eq!("1-100".parse::<PortSpec>().unwrap().count(), 100);
        assert_eq!("22,80,443,8000-8010".parse::<PortSpec>().unwrap().count(), 14);
    }

    #[test]
    fn test_port_spec_dedup_and_sort() {
        let spec: PortSpec = "443,80,80,443".parse().unwrap();
        let ports: Vec<u16> = spec.to_ports().iter().map(|p| p.as_u16()).collect();
        assert_eq!(ports, vec![80, 443]);
    }

    #[test]
    fn test_port_spec_rejects_bad_input() {
        assert!(matches!("".parse::<PortSpec>(), Err(PortError::Empty)));
        assert!(matches!(
            "0".parse::<PortSpec>(),
            Err(PortError::OutOfRange(0))
        ));
        assert!(matches!(
            "100-50".parse::<PortSpec>(),
            Err(PortError::InvalidRange(100, 50))
        ));
        assert!(matches!(
            "abc".parse::<PortSpec>(),
            Err(PortError::InvalidFormat(_))
        ));
        assert!(matches!(
            "1-2-3".parse::<PortSpec>(),
            Err(PortError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_port_spec_display_roundtrip() {
        let spec: PortSpec = "22,8000-9000".parse().unwrap();
        assert_eq!(spec.to_string(), "22,8000-9000");
    }

    #[test]
    fn test_default_sweep_is_well_known_ports() {
        let ports = PortSpec::default().to_ports();
        assert_eq!(ports.len(), 1024);
        assert_eq!(ports.first().map(|p| p.as_u16()), Some(1));
        assert_eq!(ports.last().map(|p| p.as_u16()), Some(1024));
    }
}
