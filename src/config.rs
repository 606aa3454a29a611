//! File-backed engine configuration.
//!
//! The adapter owns exactly one [`Config`] instance, bound to a fixed file
//! name inside the per-extension data directory. Settings are loaded with
//! figment (built-in defaults, then the YAML file, then `VIA_`-prefixed
//! environment variables) and validated before use.
//!
//! Reads and reloads may happen from different execution contexts, so the
//! effective settings live behind an immutable snapshot: readers clone an
//! `Arc<EngineSettings>` and a reload swaps the whole snapshot atomically.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlatformError, Result};

// Default value functions for serde defaults
fn default_check_for_updates() -> bool {
    true
}
fn default_suppress_conversion_warnings() -> bool {
    false
}
fn default_max_packets_per_second() -> u32 {
    800
}
fn default_tracking_period_secs() -> u64 {
    6
}
fn default_log_level() -> String {
    "info".to_string()
}

/// Settings consumed by the embedded protocol-translation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Whether the engine should check for translation mapping updates.
    #[serde(default = "default_check_for_updates")]
    pub check_for_updates: bool,

    /// Suppress per-packet conversion warnings in the log.
    #[serde(default = "default_suppress_conversion_warnings")]
    pub suppress_conversion_warnings: bool,

    /// Packet-rate ceiling the engine enforces per connection.
    #[serde(default = "default_max_packets_per_second")]
    pub max_packets_per_second: u32,

    /// Window over which the packet rate is tracked, in seconds.
    #[serde(default = "default_tracking_period_secs")]
    pub tracking_period_secs: u64,

    /// Log level requested for the engine's own output.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            check_for_updates: default_check_for_updates(),
            suppress_conversion_warnings: default_suppress_conversion_warnings(),
            max_packets_per_second: default_max_packets_per_second(),
            tracking_period_secs: default_tracking_period_secs(),
            log_level: default_log_level(),
        }
    }
}

impl EngineSettings {
    /// Validate settings values after loading.
    fn validate(&self) -> Result<()> {
        if self.max_packets_per_second == 0 {
            return Err(PlatformError::Config(
                "max_packets_per_second must be greater than 0".to_string(),
            ));
        }

        if self.tracking_period_secs == 0 || self.tracking_period_secs > 600 {
            return Err(PlatformError::Config(
                "tracking_period_secs must be between 1 and 600".to_string(),
            ));
        }

        if self.log_level.is_empty() {
            return Err(PlatformError::Config(
                "log_level cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// The adapter's configuration object, bound to one file on disk.
pub struct Config {
    path: PathBuf,
    settings: RwLock<Arc<EngineSettings>>,
}

impl Config {
    /// Load configuration from the given file path.
    ///
    /// Missing file is not an error: defaults apply and the file is
    /// materialized so operators have something to edit.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let existed = path.exists();
        let settings = Self::read_settings(&path)?;

        let config = Self {
            path,
            settings: RwLock::new(Arc::new(settings)),
        };

        if !existed {
            debug!(path = %config.path.display(), "config file absent, writing defaults");
            config.save()?;
        }

        Ok(config)
    }

    /// Extract settings with precedence:
    /// 1. Environment variables prefixed with `VIA_` (highest priority)
    /// 2. The YAML config file (if it exists)
    /// 3. Built-in defaults (lowest priority)
    fn read_settings(path: &Path) -> Result<EngineSettings> {
        let settings: EngineSettings = Figment::from(Serialized::defaults(EngineSettings::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("VIA_"))
            .extract()
            .map_err(|e| PlatformError::Config(format!("Failed to load configuration: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Current settings snapshot. Cheap to call from any thread.
    pub fn snapshot(&self) -> Arc<EngineSettings> {
        self.settings.read().clone()
    }

    /// Re-read the file and swap in a fresh snapshot.
    ///
    /// Readers holding the previous snapshot keep seeing consistent values;
    /// the swap itself is atomic under the lock.
    pub fn reload(&self) -> Result<()> {
        let settings = Self::read_settings(&self.path)?;
        *self.settings.write() = Arc::new(settings);
        debug!(path = %self.path.display(), "configuration reloaded");
        Ok(())
    }

    /// Write the effective settings back to the YAML file.
    pub fn save(&self) -> Result<()> {
        let snapshot = self.snapshot();
        let rendered = serde_yaml::to_string(snapshot.as_ref())?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, rendered)?;
        Ok(())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_materializes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.yml");

        let config = Config::load(&path).unwrap();

        assert!(path.exists());
        let snapshot = config.snapshot();
        assert_eq!(*snapshot, EngineSettings::default());
    }

    #[test]
    fn test_load_reads_file_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.yml");
        fs::write(&path, "max_packets_per_second: 120\ncheck_for_updates: false\n").unwrap();

        let config = Config::load(&path).unwrap();
        let snapshot = config.snapshot();

        assert_eq!(snapshot.max_packets_per_second, 120);
        assert!(!snapshot.check_for_updates);
        // Unspecified fields fall back to defaults.
        assert_eq!(snapshot.tracking_period_secs, 6);
    }

    #[test]
    fn test_reload_swaps_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.yml");

        let config = Config::load(&path).unwrap();
        let before = config.snapshot();

        fs::write(&path, "max_packets_per_second: 42\n").unwrap();
        config.reload().unwrap();

        let after = config.snapshot();
        assert_eq!(before.max_packets_per_second, 800);
        assert_eq!(after.max_packets_per_second, 42);
    }

    #[test]
    fn test_validation_rejects_zero_rate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.yml");
        fs::write(&path, "max_packets_per_second: 0\n").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(PlatformError::Config(_))));
    }

    #[test]
    fn test_validation_rejects_out_of_range_tracking_period() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.yml");
        fs::write(&path, "tracking_period_secs: 601\n").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(PlatformError::Config(_))));
    }
}
