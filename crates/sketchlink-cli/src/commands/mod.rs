pub mod config;
pub mod csp;
pub mod protocol;
pub mod record;

use anyhow::Result;
use sketchlink_core::config::RootConfig;
use sketchlink_infrastructure::TomlRecordAccessor;
use sketchlink_infrastructure::paths::BridgePaths;

/// Record accessor over the configured records directory.
pub fn record_accessor(config: &RootConfig) -> Result<TomlRecordAccessor> {
    let root = BridgePaths::records_dir_for(config)?;
    Ok(TomlRecordAccessor::new(root))
}
