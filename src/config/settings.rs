//! Application settings and paths.
//!
//! Settings live in an XDG-compliant config directory and every field falls
//! back to its default when absent.

use crate::error::{ConfigError, ConfigResult};
use crate::output::ReportFormat;
use crate::scanner::{ScanMode, LIVE_WORKERS, MAX_AUTO_WORKERS, WORKERS_PER_CORE};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/camsweep)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Resolve the platform directories. Nothing is created on disk.
    pub fn resolve() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "camsweep", "camsweep")
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
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Scan mode used when none is given.
    pub default_mode: ScanMode,
    /// Worker count for live scans.
    pub live_workers: usize,
    /// Cap on auto-scaled worker counts.
    pub max_auto_workers: usize,
    /// Workers per CPU core when auto-scaling.
    pub workers_per_core: usize,
    /// Connect timeout override in milliseconds.
    pub connect_timeout_ms: Option<u64>,
    /// Read timeout override in milliseconds.
    pub read_timeout_ms: Option<u64>,
    /// Time allowed for in-flight probes after a stop.
    pub grace_period_ms: u64,
    /// Append-only log written by live scans.
    pub live_log_path: PathBuf,
    /// Report written at the end of fast scans.
    pub report_path: PathBuf,
    pub report_format: ReportFormat,
    /// Default trace route destination.
    pub trace_target: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_mode: ScanMode::Fast,
            live_workers: LIVE_WORKERS,
            max_auto_workers: MAX_AUTO_WORKERS,
            workers_per_core: WORKERS_PER_CORE,
            connect_timeout_ms: None,
            read_timeout_ms: None,
            grace_period_ms: 1000,
            live_log_path: PathBuf::from("CCTV_Found.txt"),
            report_path: PathBuf::from("SuperFastScan_Results.txt"),
            report_format: ReportFormat::Plain,
            trace_target: "google.com".to_string(),
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, or defaults if no file exists.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::resolve()?.settings_file();

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

    /// Save settings to the default location and return the file written.
    pub fn save(&self) -> ConfigResult<PathBuf> {
        let paths = Paths::resolve()?;
        fs::create_dir_all(&paths.config_dir)?;

        let file = paths.settings_file();
        self.save_to(&file)?;
        Ok(file)
    }

    /// Save settings to a specific file.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.live_workers, 100);
        assert_eq!(settings.max_auto_workers, 500);
        assert_eq!(settings.workers_per_core, 50);
        assert_eq!(settings.live_log_path, PathBuf::from("CCTV_Found.txt"));
        assert_eq!(settings.report_path, PathBuf::from("SuperFastScan_Results.txt"));
        assert_eq!(settings.connect_timeout(), None);
        assert_eq!(settings.grace_period(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let parsed: AppSettings =
            serde_json::from_str(r#"{"live_workers": 20, "default_mode": "live"}"#).unwrap();
        assert_eq!(parsed.live_workers, 20);
        assert_eq!(parsed.default_mode, ScanMode::Live);
        assert_eq!(parsed.trace_target, "google.com");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = AppSettings {
            read_timeout_ms: Some(750),
            report_format: ReportFormat::Csv,
            ..AppSettings::default()
        };
        settings.save_to(&path).unwrap();

        let loaded = AppSettings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.read_timeout(), Some(Duration::from_millis(750)));
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let err = AppSettings::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat(_)));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppSettings::load_from(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFailed { .. }));
    }
}
