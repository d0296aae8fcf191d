//! Firewall IP blocking.
//!
//! Issues an OS-level inbound-deny rule through the platform firewall
//! command: `netsh advfirewall` on Windows, `iptables` elsewhere. Rules
//! are named deterministically from the address so they can be removed
//! later. Requires elevated privileges.

use crate::error::BlockError;
use std::net::IpAddr;
use std::process::Command;

/// Deterministic rule name for a blocked address.
pub fn rule_name(address: IpAddr) -> String {
    format!("netwarden-block-{address}")
}

/// Create an inbound-deny rule for `address`.
///
/// Returns a human-readable confirmation on success.
pub fn block_ip(address: IpAddr) -> Result<String, BlockError> {
    run(block_command(address))?;
    Ok(format!(
        "Created firewall rule {} blocking inbound traffic from {}",
        rule_name(address),
        address
    ))
}

/// Remove the inbound-deny rule for `address`.
pub fn unblock_ip(address: IpAddr) -> Result<String, BlockError> {
    run(unblock_command(address))?;
    Ok(format!("Removed firewall rule {}", rule_name(address)))
}

fn run(mut command: Command) -> Result<(), BlockError> {
    let output = command
        .output()
        .map_err(|e| BlockError::Firewall(format!("could not invoke firewall command: {e}")))?;

    if output.status.success() {
        return Ok(());
    }

    let mut reason = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if reason.is_empty() {
        reason = String::from_utf8_lossy(&output.stdout).trim().to_string();
    }

    let lowered = reason.to_lowercase();
    if lowered.contains("denied") || lowered.contains("elevation") || lowered.contains("permitted")
    {
        return Err(BlockError::PermissionDenied(format!(
            "firewall changes require administrator/root privileges: {reason}"
        )));
    }
    Err(BlockError::Firewall(reason))
}

#[cfg(windows)]
fn block_command(address: IpAddr) -> Command {
    let mut cmd = Command::new("netsh");
    cmd.args([
        "advfirewall",
        "firewall",
        "add",
        "rule",
        &format!("name={}", rule_name(address)),
        "dir=in",
        "action=block",
        &format!("remoteip={address}"),
    ]);
    cmd
}

#[cfg(windows)]
fn unblock_command(address: IpAddr) -> Command {
    let mut cmd = Command::new("netsh");
    cmd.args([
        "advfirewall",
        "firewall",
        "delete",
        "rule",
        &format!("name={}", rule_name(address)),
    ]);
    cmd
}

#[cfg(not(windows))]
fn block_command(address: IpAddr) -> Command {
    let mut cmd = Command::new("iptables");
    cmd.args([
        "-I",
        "INPUT",
        "-s",
        &address.to_string(),
        "-j",
        "DROP",
        "-m",
        "comment",
        "--comment",
        &rule_name(address),
    ]);
    cmd
}

#[cfg(not(windows))]
fn unblock_command(address: IpAddr) -> Command {
    let mut cmd = Command::new("iptables");
    cmd.args([
        "-D",
        "INPUT",
        "-s",
        &address.to_string(),
        "-j",
        "DROP",
        "-m",
        "comment",
        "--comment",
        &rule_name(address),
    ]);
    cmd
}
