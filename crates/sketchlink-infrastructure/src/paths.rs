//! Unified path management for sketchlink files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/sketchlink/        # Config directory
//! └── config.toml              # RootConfig
//!
//! ~/.local/share/sketchlink/   # Data directory
//! └── records/                 # One <id>.toml (+ <id>.png preview) per record
//! ```

use sketchlink_core::config::RootConfig;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "sketchlink";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config/data directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Platform paths for sketchlink.
pub struct BridgePaths;

impl BridgePaths {
    /// Returns the configuration directory (e.g. `~/.config/sketchlink/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the data directory (e.g. `~/.local/share/sketchlink/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the default records directory.
    pub fn records_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("records"))
    }

    /// Records directory from config, or the platform default.
    pub fn records_dir_for(config: &RootConfig) -> Result<PathBuf, PathError> {
        match &config.storage.records_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::records_dir(),
        }
    }
}
