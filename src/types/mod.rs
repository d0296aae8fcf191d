//! Core type definitions.
//!
//! Newtype patterns keep raw port numbers and address strings from leaking
//! through the scanner: malformed input is rejected at construction, before
//! any traffic is sent.

pub mod host;
pub mod port;
pub mod range;

pub use host::DiscoveredHost;
pub use port::{Port, PortError, PortSpec};
pub use range::{NetworkRange, RangeError};
