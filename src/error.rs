//! Error types for probekit.
//!
//! Uses `thiserror` for ergonomic error definitions. Network failures are
//! deliberately absent: a refused or timed-out connection is an outcome of a
//! probe, not an error of the operation that ran it.

use std::path::PathBuf;
use thiserror::Error;

/// Input validation failures, raised before any network I/O.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("host must not be empty")]
    EmptyHost,

    #[error("expected host:port, got '{0}'")]
    MissingPort(String),

    #[error("invalid port '{0}' (expected 1-65535)")]
    InvalidPort(String),

    #[error("invalid CIDR '{0}' (expected a.b.c.d/n)")]
    InvalidCidr(String),

    #[error("invalid prefix length '{0}' (expected 0-32)")]
    InvalidPrefix(String),

    #[error("invalid IPv4 address '{0}'")]
    InvalidAddress(String),

    #[error("port specification '{0}' contains no valid ports")]
    EmptyPortSet(String),
}

/// Errors from loading or saving application settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("{0} already exists (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Top-level error for command execution.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("output failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Result alias for validated inputs.
pub type InputResult<T> = Result<T, InputError>;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result alias for command execution.
pub type CliResult<T> = Result<T, CliError>;
