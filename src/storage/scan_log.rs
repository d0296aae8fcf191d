//! Plain-text scan log writer.
//!
//! Persists each completed scan as a timestamped text file: one section
//! per host, one line per open port with its banner. An empty result set
//! writes nothing.

use crate::config::Paths;
use crate::error::LogError;
use crate::scanner::ScanResultSet;
use chrono::Local;
use std::fs;
use std::path::PathBuf;

/// Placeholder written when a port yielded no banner.
const NO_BANNER: &str = "No banner retrieved";

/// Writes completed scans into a logs directory.
pub struct ScanLogWriter {
    logs_dir: PathBuf,
}

impl ScanLogWriter {
    /// Writer targeting the default logs directory.
    pub fn new() -> Self {
        Self {
            logs_dir: Paths::get().logs_dir(),
        }
    }

    /// Writer targeting a specific directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            logs_dir: dir.into(),
        }
    }

    /// Persist a completed result set.
    ///
    /// Returns the written path, or `Ok(None)` for an empty set (no file
    /// is created in that case).
    pub fn save(&self, results: &ScanResultSet) -> Result<Option<PathBuf>, LogError> {
        if results.is_empty() {
            return Ok(None);
        }

        fs::create_dir_all(&self.logs_dir).map_err(|e| LogError::DirectoryFailed {
            path: self.logs_dir.clone(),
            reason: e.to_string(),
        })?;

        let now = Local::now();
        let path = self
            .logs_dir
            .join(format!("scan_log_{}.txt", now.format("%Y-%m-%d_%H-%M-%S")));

        let mut contents = format!("Scan Results - {}\n", now.format("%Y-%m-%d %H:%M:%S"));
        contents.push_str(&"=".repeat(40));
        contents.push_str("\n\n");

        for (host, result) in results.iter() {
            contents.push_str(&format!("Host: {host}\n"));
            for outcome in result.iter() {
                let banner = outcome.banner.as_deref().unwrap_or(NO_BANNER);
                contents.push_str(&format!(
                    "  - Port {:<5}: {}\n",
                    outcome.port.as_u16(),
                    banner
                ));
            }
            contents.push('\n');
        }

        fs::write(&path, contents).map_err(|e| LogError::WriteFailed {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        Ok(Some(path))
    }
}

impl Default for ScanLogWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::HostResult;
    use crate::types::Port;
    use std::net::Ipv4Addr;

    fn sample_results() -> ScanResultSet {
        let mut result = HostResult::default();
        result.record(Port::new(22).unwrap(), Some("SSH-2.0-OpenSSH_8.9".to_string()));
        result.record(Port::new(23).unwrap(), None);

        let mut set = ScanResultSet::default();
        set.insert("192.168.1.5".parse::<Ipv4Addr>().unwrap(), result);
        set
    }

    #[test]
    fn test_empty_set_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ScanLogWriter::with_dir(dir.path());

        let written = writer.save(&ScanResultSet::default()).unwrap();
        assert!(written.is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_log_format() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ScanLogWriter::with_dir(dir.path());

        let path = writer.save(&sample_results()).unwrap().unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("scan_log_"));
        assert!(name.ends_with(".txt"));

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Scan Results - "));
        assert!(contents.contains("Host: 192.168.1.5"));
        assert!(contents.contains("  - Port 22   : SSH-2.0-OpenSSH_8.9"));
        assert!(contents.contains("  - Port 23   : No banner retrieved"));
    }

    #[test]
    fn test_unwritable_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the logs directory should be.
        let clash = dir.path().join("logs");
        fs::write(&clash, b"not a directory").unwrap();

        let writer = ScanLogWriter::with_dir(&clash);
        assert!(writer.save(&sample_results()).is_err());
    }
}
