//! Block, unblock, and blocklist subcommand implementations.

use crate::config::AppSettings;
use crate::error::CliResult;
use crate::output;
use crate::protection::{firewall, HostsEditor};
use clap::{Parser, Subcommand};
use std::net::IpAddr;

/// What a block or unblock operation targets.
#[derive(Subcommand, Debug)]
pub enum BlockTarget {
    /// Redirect a domain to the loopback address via the hosts file
    Domain {
        /// Domain name to block
        domain: String,
    },
    /// Create an inbound-deny firewall rule for an address
    Ip {
        /// IP address to block
        address: IpAddr,
    },
}

/// Block a domain or an IP address.
#[derive(Parser, Debug)]
pub struct BlockCommand {
    #[command(subcommand)]
    pub target: BlockTarget,
}

impl BlockCommand {
    pub fn execute(&self) -> CliResult<()> {
        let settings = AppSettings::load()?;
        match &self.target {
            BlockTarget::Domain { domain } => {
                HostsEditor::new(settings.redirect_ip).block(domain)?;
                output::print_info(&format!("Blocked {domain}"));
            }
            BlockTarget::Ip { address } => {
                let message = firewall::block_ip(*address)?;
                output::print_info(&message);
            }
        }
        Ok(())
    }
}

/// Remove a previously created block.
#[derive(Parser, Debug)]
pub struct UnblockCommand {
    #[command(subcommand)]
    pub target: BlockTarget,
}

impl UnblockCommand {
    pub fn execute(&self) -> CliResult<()> {
        let settings = AppSettings::load()?;
        match &self.target {
            BlockTarget::Domain { domain } => {
                HostsEditor::new(settings.redirect_ip).unblock(domain)?;
                output::print_info(&format!("Unblocked {domain}"));
            }
            BlockTarget::Ip { address } => {
                let message = firewall::unblock_ip(*address)?;
                output::print_info(&message);
            }
        }
        Ok(())
    }
}

/// List domains currently blocked through the hosts file.
#[derive(Parser, Debug)]
pub struct BlocklistCommand {}

impl BlocklistCommand {
    pub fn execute(&self) -> CliResult<()> {
        let settings = AppSettings::load()?;
        let domains = HostsEditor::new(settings.redirect_ip).blocked_domains()?;

        if domains.is_empty() {
            output::print_info("No domains are currently blocked.");
        } else {
            for domain in domains {
                println!("{domain}");
            }
        }
        Ok(())
    }
}
