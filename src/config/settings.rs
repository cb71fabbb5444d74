//! Application settings and paths.
//!
//! Settings live in `settings.json` under the XDG configuration directory.
//! A missing file is not an error; every field falls back to its default.

use crate::cli::OutputFormat;
use crate::error::{ConfigError, ConfigResult};
use crate::proxy::{DEFAULT_PROXY_TIMEOUT, DEFAULT_SAMPLE_LIMIT};
use crate::scanner::{Scheduling, DEFAULT_BATCH_SIZE, DEFAULT_CONNECT_TIMEOUT};
use crate::subnet::PointToPointPolicy;
use crate::types::PortSet;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/probekit)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the configuration directory. Nothing is created on disk.
    pub fn new() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "probekit", "probekit")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Per-port connect deadline in milliseconds.
    pub scan_timeout_ms: u64,
    /// Maximum connection attempts in flight during a sweep.
    pub batch_size: usize,
    /// Batch scheduling strategy.
    pub scheduling: Scheduling,
    /// Deadline for a whole proxy check in milliseconds.
    pub proxy_timeout_ms: u64,
    /// Maximum characters of proxy reply kept as a sample.
    pub sample_limit: usize,
    /// Treatment of /31 networks.
    pub point_to_point: PointToPointPolicy,
    /// Port range used when `scan` is given none.
    pub default_range: String,
    /// Default output format.
    pub output: OutputFormat,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            scan_timeout_ms: millis(DEFAULT_CONNECT_TIMEOUT),
            batch_size: DEFAULT_BATCH_SIZE,
            scheduling: Scheduling::Batched,
            proxy_timeout_ms: millis(DEFAULT_PROXY_TIMEOUT),
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            point_to_point: PointToPointPolicy::Legacy,
            default_range: PortSet::DEFAULT_SPEC.to_string(),
            output: OutputFormat::Plain,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::new()?.settings_file();

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

    /// Save settings to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }

    pub fn proxy_timeout(&self) -> Duration {
        Duration::from_millis(self.proxy_timeout_ms)
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.scan_timeout_ms, 600);
        assert_eq!(settings.batch_size, 200);
        assert_eq!(settings.proxy_timeout_ms, 5000);
        assert_eq!(settings.sample_limit, 1000);
        assert_eq!(settings.default_range, "1-1024");
        assert_eq!(settings.point_to_point, PointToPointPolicy::Legacy);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "batch_size": 50, "scheduling": "windowed" }"#).unwrap();

        let settings = AppSettings::load_from(&path).unwrap();
        assert_eq!(settings.batch_size, 50);
        assert_eq!(settings.scheduling, Scheduling::Windowed);
        assert_eq!(settings.scan_timeout_ms, 600);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = AppSettings {
            point_to_point: PointToPointPolicy::Rfc3021,
            output: OutputFormat::Json,
            ..AppSettings::default()
        };
        settings.save_to(&path).unwrap();

        assert_eq!(AppSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            AppSettings::load_from(&path),
            Err(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            AppSettings::load_from(&dir.path().join("absent.json")),
            Err(ConfigError::ReadFailed { .. })
        ));
    }
}
