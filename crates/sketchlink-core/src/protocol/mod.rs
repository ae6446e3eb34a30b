//! Wire protocol between the host and the embedded diagram editor.
//!
//! The editor lives in an isolated frame and talks to the host through an
//! untyped message channel that may also carry unrelated traffic. Outbound
//! messages are JSON objects keyed by `action`; inbound ones are keyed by
//! `event`.
//!
//! # Module Structure
//!
//! - `command`: Host-to-editor commands (`OutboundCommand`, `ExportFormat`)
//! - `event`: Editor-to-host events (`InboundEvent`, `ExportPayload`)
//! - `channel`: Adapter over the raw post primitive (`ChannelAdapter`, `EditorPort`)

mod channel;
mod command;
mod event;

// Re-export public API
pub use channel::{ChannelAdapter, EditorPort};
pub use command::{ExportFormat, ExportOptions, OutboundCommand};
pub use event::{ExportPayload, InboundEvent};
