//! Hosts-file domain blocking.
//!
//! Blocking a domain appends a tagged redirect entry to the system hosts
//! file; unblocking rewrites the file without the matching tagged lines.
//! Entries written by other tools are never touched.

use crate::error::BlockError;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

/// Marker identifying entries this tool owns.
const BLOCK_TAG: &str = "# Blocked by netwarden";

#[cfg(windows)]
const HOSTS_FILE: &str = r"C:\Windows\System32\drivers\etc\hosts";
#[cfg(not(windows))]
const HOSTS_FILE: &str = "/etc/hosts";

/// Editor for the tool-owned section of the hosts file.
pub struct HostsEditor {
    path: PathBuf,
    redirect: Ipv4Addr,
}

impl HostsEditor {
    /// Editor over the platform hosts file.
    pub fn new(redirect: Ipv4Addr) -> Self {
        Self {
            path: PathBuf::from(HOSTS_FILE),
            redirect,
        }
    }

    /// Editor over an arbitrary file.
    pub fn with_path(path: impl Into<PathBuf>, redirect: Ipv4Addr) -> Self {
        Self {
            path: path.into(),
            redirect,
        }
    }

    /// Domains currently blocked by this tool.
    pub fn blocked_domains(&self) -> Result<Vec<String>, BlockError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            // No hosts file means no blocked domains.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(map_io(e, &self.path)),
        };

        Ok(contents
            .lines()
            .filter(|line| line.contains(BLOCK_TAG))
            .filter_map(|line| line.split_whitespace().nth(1).map(str::to_string))
            .collect())
    }

    /// Append a tagged redirect entry for `domain`.
    pub fn block(&self, domain: &str) -> Result<(), BlockError> {
        let entry = format!(
            "\n{}\t{}\t{} on {}\n",
            self.redirect,
            domain,
            BLOCK_TAG,
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| map_io(e, &self.path))?;
        file.write_all(entry.as_bytes())
            .map_err(|e| map_io(e, &self.path))
    }

    /// Rewrite the hosts file without the tagged entries for `domain`.
    ///
    /// Errors with [`BlockError::NotBlocked`] if no such entry exists.
    pub fn unblock(&self, domain: &str) -> Result<(), BlockError> {
        let contents = fs::read_to_string(&self.path).map_err(|e| map_io(e, &self.path))?;

        let mut found = false;
        let kept: Vec<&str> = contents
            .lines()
            .filter(|line| {
                let ours =
                    line.contains(BLOCK_TAG) && line.split_whitespace().nth(1) == Some(domain);
                if ours {
                    found = true;
                }
                !ours
            })
            .collect();

        if !found {
            return Err(BlockError::NotBlocked(domain.to_string()));
        }

        let mut rewritten = kept.join("\n");
        rewritten.push('\n');
        fs::write(&self.path, rewritten).map_err(|e| map_io(e, &self.path))
    }
}

fn map_io(err: std::io::Error, path: &Path) -> BlockError {
    if err.kind() == ErrorKind::PermissionDenied {
        BlockError::PermissionDenied(format!(
            "cannot modify {}; run as administrator/root",
            path.display()
        ))
    } else {
        BlockError::Io(err)
    }
}
