//! Error types for netwarden.
//!
//! Uses `thiserror` for ergonomic error definitions. Each subsystem gets
//! its own enum; the CLI collapses them into [`CliError`] at the boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for discovery and scanning operations.
///
/// Transient network conditions (refused, unreachable, timed out) are NOT
/// errors; they surface as negative probe outcomes or absent banners.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    InvalidRange(#[from] crate::types::RangeError),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("no usable network interface found")]
    NoInterface,

    #[error("interface not found: {0}")]
    InterfaceNotFound(String),

    #[error("datalink channel error: {0}")]
    Channel(String),

    #[error("invalid packet: {0}")]
    InvalidPacket(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors writing the scan log file.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("could not create log directory {path}: {reason}")]
    DirectoryFailed { path: PathBuf, reason: String },

    #[error("could not write log file {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },
}

/// Errors from the hosts-file and firewall blocking collaborators.
#[derive(Error, Debug)]
pub enum BlockError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("domain {0} is not in the block list")]
    NotBlocked(String),

    #[error("firewall command failed: {0}")]
    Firewall(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine platform directories")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level error for CLI command execution.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Range(#[from] crate::types::RangeError),

    #[error(transparent)]
    Port(#[from] crate::types::PortError),

    #[error(transparent)]
    Block(#[from] BlockError),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
