//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml` (by default
//! `~/.config/sketchlink/config.toml`) and caches it.

use crate::paths::BridgePaths;
use crate::storage::AtomicTomlFile;
use sketchlink_core::config::RootConfig;
use sketchlink_core::error::{BridgeError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the platform default `config.toml`.
    pub fn new() -> Result<Self> {
        let path = BridgePaths::config_file().map_err(|e| BridgeError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    /// Creates a service reading `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Path of the configuration file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the root configuration, loading from file if not cached.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn get_config(&self) -> Result<RootConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        {
            let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Writes `config` to the file and refreshes the cache.
    pub fn save_config(&self, config: &RootConfig) -> Result<()> {
        AtomicTomlFile::<RootConfig>::new(self.path.clone()).save(config)?;
        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = Some(config.clone());
        Ok(())
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = None;
    }

    fn load_config(&self) -> Result<RootConfig> {
        let file = AtomicTomlFile::<RootConfig>::new(self.path.clone());
        match file.load()? {
            Some(config) => {
                tracing::debug!(path = %self.path.display(), "loaded configuration");
                Ok(config)
            }
            None => {
                tracing::debug!(path = %self.path.display(), "no configuration file, using defaults");
                Ok(RootConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

        let config = service.get_config().unwrap();
        assert_eq!(config, RootConfig::default());
    }

    #[test]
    fn test_cache_until_invalidated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::with_path(&path);

        assert_eq!(service.get_config().unwrap().editor.load_fallback_delay_ms, 500);

        fs::write(&path, "[editor]\nload_fallback_delay_ms = 1500\n").unwrap();
        assert_eq!(service.get_config().unwrap().editor.load_fallback_delay_ms, 500);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().editor.load_fallback_delay_ms, 1500);
    }

    #[test]
    fn test_malformed_file_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[editor\nbroken").unwrap();

        let err = ConfigService::with_path(&path).get_config().unwrap_err();
        assert!(err.is_serialization());
    }

    #[test]
    fn test_save_round_trips_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::with_path(&path);

        let mut config = RootConfig::default();
        config.editor.export_timeout_ms = Some(20_000);
        service.save_config(&config).unwrap();

        let fresh = ConfigService::with_path(&path);
        assert_eq!(fresh.get_config().unwrap().editor.export_timeout_ms, Some(20_000));
    }
}
