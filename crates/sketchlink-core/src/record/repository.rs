//! Record accessor trait.
//!
//! Defines the interface the bridge uses to read a record's diagram and write
//! the exported diagram back.

use super::model::{DiagramRecord, RecordId};
use crate::error::Result;
use crate::export::ExportResult;
use async_trait::async_trait;

/// An abstract accessor for the records that own diagrams.
///
/// This trait decouples the session protocol from the storage mechanism
/// (TOML files, a remote ORM, an in-memory map).
///
/// # Implementation Notes
///
/// Implementations should:
/// - Return `BridgeError::NotFound` for unknown records
/// - Return `BridgeError::Transport` (or another error) when the store is unreachable
/// - Store `ExportResult::image` as the base64 text it is, or decode it via
///   `ExportResult::decode_image` when they keep binary previews
#[async_trait]
pub trait RecordAccessor: Send + Sync {
    /// Reads the stored diagram of a record.
    ///
    /// # Arguments
    ///
    /// * `record_id` - The record to read
    ///
    /// # Returns
    ///
    /// - `Ok(DiagramRecord)`: Stored document and name (either may be absent)
    /// - `Err(_)`: Record not found or the store could not be reached
    async fn read(&self, record_id: &RecordId) -> Result<DiagramRecord>;

    /// Writes an exported diagram back to a record.
    ///
    /// # Arguments
    ///
    /// * `record_id` - The record to update
    /// * `export` - Normalized document text and optional base64 preview
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Diagram stored
    /// - `Err(_)`: Write failed; the caller keeps the session open for retry
    async fn write(&self, record_id: &RecordId, export: &ExportResult) -> Result<()>;
}
