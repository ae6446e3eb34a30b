//! Logging setup for sketchlink hosts.
//!
//! [`init_logging`] installs the global subscriber from a [`LoggingConfig`];
//! [`BridgeEventLayer`] forwards log events to a channel so a host UI can
//! display them next to the editor.
//!
//! [`LoggingConfig`]: sketchlink_core::config::LoggingConfig

mod event_layer;
mod init;

pub use event_layer::{BridgeEventLayer, BridgeLogEvent};
pub use init::{LOG_FILE_PREFIX, filter_directive, init_logging};
pub use tracing_appender::non_blocking::WorkerGuard;
