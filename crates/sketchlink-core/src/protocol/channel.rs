//! Channel adapter over the raw cross-frame post primitive.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::command::OutboundCommand;
use super::event::InboundEvent;

/// The raw endpoint used to post text into the editor frame.
///
/// Equivalent of `postMessage` on the frame's window. Implementations must
/// not block; delivery is fire-and-forget.
pub trait EditorPort: Send + Sync {
    /// Posts a serialized message to the editor.
    fn post(&self, payload: &str);
}

/// Serializes outgoing commands and validates incoming payloads.
///
/// The adapter may be created before the editor frame exists. Until a port
/// is attached, `send` does nothing.
#[derive(Default)]
pub struct ChannelAdapter {
    port: Option<Arc<dyn EditorPort>>,
    sent: AtomicUsize,
}

impl ChannelAdapter {
    /// Creates an adapter with no endpoint attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter bound to `port`.
    pub fn with_port(port: Arc<dyn EditorPort>) -> Self {
        Self {
            port: Some(port),
            sent: AtomicUsize::new(0),
        }
    }

    /// Attaches the editor endpoint, replacing any previous one.
    pub fn attach(&mut self, port: Arc<dyn EditorPort>) {
        self.port = Some(port);
    }

    /// Detaches the editor endpoint. Later sends become no-ops.
    pub fn detach(&mut self) {
        self.port = None;
    }

    /// Returns true when an endpoint is attached.
    pub fn is_attached(&self) -> bool {
        self.port.is_some()
    }

    /// Number of commands actually posted to the endpoint.
    pub fn sent_count(&self) -> usize {
        self.sent.load(Ordering::Relaxed)
    }

    /// Serializes `command` and posts it to the editor.
    pub fn send(&self, command: &OutboundCommand) {
        let Some(port) = self.port.as_ref() else {
            tracing::debug!(action = command.action(), "editor endpoint not attached, dropping command");
            return;
        };

        match command.to_wire() {
            Ok(payload) => {
                tracing::debug!(action = command.action(), bytes = payload.len(), "posting command to editor");
                port.post(&payload);
                self.sent.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!(action = command.action(), error = %e, "failed to serialize editor command");
            }
        }
    }

    /// Translates a raw channel payload into an event.
    ///
    /// Foreign or malformed traffic becomes `InboundEvent::Unknown`.
    pub fn receive(&self, raw: &str) -> InboundEvent {
        InboundEvent::try_parse(raw).unwrap_or_else(|e| {
            tracing::trace!(bytes = raw.len(), error = %e, "ignoring unrecognized channel payload");
            InboundEvent::Unknown
        })
    }
}

impl fmt::Debug for ChannelAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelAdapter")
            .field("attached", &self.is_attached())
            .field("sent", &self.sent_count())
            .finish()
    }
}
