//! Record domain module.
//!
//! A record is the backing entity a diagram belongs to. The bridge only ever
//! reads its stored document/name and writes back a document plus preview.
//!
//! # Module Structure
//!
//! - `model`: Record identifier and stored diagram (`RecordId`, `DiagramRecord`)
//! - `repository`: Record accessor trait for reading and writing diagrams

mod model;
mod repository;

// Re-export public API
pub use model::{DEFAULT_DOCUMENT_NAME, DiagramRecord, RecordId};
pub use repository::RecordAccessor;
