//! TOML file-based record accessor.
//!
//! Each record is a `<id>.toml` file in one directory. When an export carries
//! a preview, the decoded PNG is written next to it as `<id>.png` so other
//! tools can show it without a base64 round trip.

use crate::storage::{AtomicTomlFile, write_bytes_atomic};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sketchlink_core::error::{BridgeError, Result};
use sketchlink_core::export::ExportResult;
use sketchlink_core::record::{DiagramRecord, RecordAccessor, RecordId};
use std::fs;
use std::path::{Path, PathBuf};

const RECORD_ENTITY: &str = "record";

/// On-disk shape of a record file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct RecordFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    diagram_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    diagram_xml: Option<String>,
    /// Base64 preview, as received from the editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    diagram_png: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

/// A record accessor that stores records as TOML files in a directory.
#[derive(Debug, Clone)]
pub struct TomlRecordAccessor {
    root: PathBuf,
}

impl TomlRecordAccessor {
    /// Creates an accessor rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the record files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record file for `record_id`.
    pub fn record_path(&self, record_id: &RecordId) -> Result<PathBuf> {
        Ok(self.root.join(format!("{}.toml", checked_stem(record_id)?)))
    }

    /// Path of the decoded preview for `record_id`.
    pub fn preview_path(&self, record_id: &RecordId) -> Result<PathBuf> {
        Ok(self.root.join(format!("{}.png", checked_stem(record_id)?)))
    }

    /// Creates an empty record with an optional diagram name.
    ///
    /// Fails if the record already exists.
    pub async fn create(&self, record_id: &RecordId, name: Option<String>) -> Result<()> {
        let path = self.record_path(record_id)?;
        let id = record_id.clone();

        run_blocking(move || {
            let file = AtomicTomlFile::<RecordFile>::new(path);
            file.update(|current| match current {
                Some(_) => Err(BridgeError::data_access(format!("Record '{}' already exists", id))),
                None => Ok(RecordFile {
                    diagram_name: name,
                    updated_at: Some(chrono::Utc::now().to_rfc3339()),
                    ..RecordFile::default()
                }),
            })
            .map(|_| ())
        })
        .await?;

        tracing::info!(record_id = %record_id, "created record");
        Ok(())
    }
}

#[async_trait]
impl RecordAccessor for TomlRecordAccessor {
    async fn read(&self, record_id: &RecordId) -> Result<DiagramRecord> {
        let path = self.record_path(record_id)?;
        let loaded = run_blocking(move || AtomicTomlFile::<RecordFile>::new(path).load()).await?;

        let file = loaded.ok_or_else(|| BridgeError::not_found(RECORD_ENTITY, record_id.as_str()))?;
        Ok(DiagramRecord::new(file.diagram_xml, file.diagram_name))
    }

    async fn write(&self, record_id: &RecordId, export: &ExportResult) -> Result<()> {
        let path = self.record_path(record_id)?;
        let preview_path = self.preview_path(record_id)?;
        // Decode first so a bad preview never leaves a half-written record
        let preview = export.decode_image()?;
        let export = export.clone();
        let id = record_id.clone();

        run_blocking(move || {
            let file = AtomicTomlFile::<RecordFile>::new(path);
            // The preview is settled under the record lock and before the
            // record itself, so a failed preview leaves the record unchanged
            file.update(|current| {
                let mut record =
                    current.ok_or_else(|| BridgeError::not_found(RECORD_ENTITY, id.as_str()))?;

                match preview {
                    Some(bytes) => write_bytes_atomic(&preview_path, &bytes)?,
                    None if preview_path.exists() => fs::remove_file(&preview_path)?,
                    None => {}
                }

                record.diagram_xml = Some(export.document);
                record.diagram_png = export.image;
                record.updated_at = Some(chrono::Utc::now().to_rfc3339());
                Ok(record)
            })
            .map(|_| ())
        })
        .await?;

        tracing::info!(record_id = %record_id, "stored diagram");
        Ok(())
    }
}

fn checked_stem(record_id: &RecordId) -> Result<&str> {
    if record_id.is_path_safe() {
        Ok(record_id.as_str())
    } else {
        Err(BridgeError::data_access(format!(
            "Record id '{}' cannot be used as a file name",
            record_id
        )))
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| BridgeError::internal(format!("Storage task failed: {}", e)))?
}
