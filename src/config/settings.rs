//! Application settings and paths.
//!
//! Manages XDG-compliant paths for configuration and data. Defaults
//! mirror the tool's observed behavior: ports 1-1024, 50 simultaneous
//! host tasks, one-second probes.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Global paths singleton.
static PATHS: OnceLock<Paths> = OnceLock::new();

/// Application directory paths following the XDG Base Directory
/// Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/netwarden)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/netwarden)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Get the global paths instance.
    pub fn get() -> &'static Paths {
        PATHS.get_or_init(|| Self::new().expect("Failed to initialize paths"))
    }

    fn new() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "netwarden", "netwarden").ok_or(ConfigError::DirectoryNotFound)?;

        let paths = Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        };

        fs::create_dir_all(&paths.config_dir)?;
        fs::create_dir_all(&paths.data_dir)?;

        Ok(paths)
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the directory scan logs are written into.
    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Port space swept on every discovered host.
    pub ports: String,
    /// Maximum simultaneous host tasks.
    pub concurrency: usize,
    /// TCP connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Banner read timeout in milliseconds.
    pub banner_timeout_ms: u64,
    /// ARP reply collection window in milliseconds.
    pub discovery_window_ms: u64,
    /// Address blocked domains are redirected to.
    pub redirect_ip: Ipv4Addr,
    /// Write a scan log after every completed scan.
    pub auto_save_logs: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            ports: "1-1024".to_string(),
            concurrency: 50,
            connect_timeout_ms: 1000,
            banner_timeout_ms: 2000,
            discovery_window_ms: 1000,
            redirect_ip: Ipv4Addr::LOCALHOST,
            auto_save_logs: true,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, falling back to defaults
    /// when no settings file exists yet.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::get().settings_file();
        if !file.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Save settings to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        let file = Paths::get().settings_file();
        let content = serde_json::to_string_pretty(self)?;

        fs::write(&file, content).map_err(|e| ConfigError::WriteFailed {
            path: file,
            reason: e.to_string(),
        })
    }
}
