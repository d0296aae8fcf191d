//! Protective collaborators fed by scan findings.
//!
//! These are deliberately small, single-purpose I/O wrappers: a
//! hosts-file domain blocker and a firewall IP blocker. Both need
//! elevated filesystem or OS privileges and say so when they fail.

pub mod firewall;
pub mod hosts;

pub use hosts::HostsEditor;
