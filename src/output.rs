//! Terminal output formatting.
//!
//! Produces human-readable output with colors, plus a JSON mode for
//! piping results into other tools.

use crate::alerts;
use crate::scanner::ScanResultSet;
use crate::types::Port;
use console::style;
use std::io::{self, Write};
use std::net::Ipv4Addr;

/// Print scan results in human-readable plain text.
pub fn print_results(results: &ScanResultSet) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out)?;
    writeln!(
        out,
        "{}",
        style("═══════════════════════════════════════════════════").cyan()
    )?;
    writeln!(out, "          {} Scan Results", style("netwarden").cyan().bold())?;
    writeln!(
        out,
        "{}",
        style("═══════════════════════════════════════════════════").cyan()
    )?;
    writeln!(out)?;

    if results.is_empty() {
        writeln!(out, "  {}", style("No hosts with open ports found.").dim())?;
        writeln!(out)?;
        return Ok(());
    }

    for (host, result) in results.iter() {
        writeln!(
            out,
            "  {} {}  ({} open)",
            style("Host:").bold(),
            style(host).green().bold(),
            result.len()
        )?;

        for outcome in result.iter() {
            let banner = outcome
                .banner
                .as_deref()
                .map(|b| b.to_string())
                .unwrap_or_else(|| style("-").dim().to_string());

            match alerts::classify(outcome.port) {
                Some(reason) => writeln!(
                    out,
                    "    {:>5}  {}  {} {}",
                    style(outcome.port.as_u16()).red().bold(),
                    banner,
                    style("CRITICAL:").red().bold(),
                    style(reason).red()
                )?,
                None => writeln!(
                    out,
                    "    {:>5}  {}",
                    style(outcome.port.as_u16()).green(),
                    banner
                )?,
            }
        }
        writeln!(out)?;
    }

    writeln!(
        out,
        "  {} host(s) with at least one open port",
        style(results.len()).bold()
    )?;
    writeln!(out)?;

    Ok(())
}

/// Print scan results as pretty JSON.
pub fn print_json(results: &ScanResultSet) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(results)?);
    Ok(())
}

/// Print an advisory status line.
pub fn print_info(message: &str) {
    println!("{} {}", style("[*]").cyan(), message);
}

/// Print a warning the user should act on.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", style("[!]").yellow().bold(), message);
}

/// Print a critical-finding alert.
pub fn print_critical(host: Ipv4Addr, port: Port, reason: &str) {
    eprintln!(
        "{} {}:{} {}",
        style("[CRITICAL]").red().bold(),
        style(host).bold(),
        style(port).bold(),
        reason
    );
}
