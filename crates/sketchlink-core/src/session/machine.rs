//! Sans-I/O session state machine.
//!
//! The machine never touches the channel, the record store or the host UI.
//! Each input returns the [`Directive`]s the caller must carry out, in order.
//! This keeps every transition synchronous and testable, while the driver in
//! the application layer owns the asynchronous parts.

use super::state::SessionState;
use crate::config::EditorConfig;
use crate::error::BridgeError;
use crate::export::{self, ExportResult};
use crate::protocol::{ExportFormat, InboundEvent, OutboundCommand};
use crate::record::{DiagramRecord, RecordId};

/// Message shown after a successful save.
pub const SAVED_MESSAGE: &str = "Diagram saved.";

/// Message shown when a session is opened without a record.
pub const MISSING_RECORD_MESSAGE: &str = "No active record.";

/// Format requested on every export; the record keeps both document and preview.
const SESSION_EXPORT_FORMAT: ExportFormat = ExportFormat::XmlPng;

/// A side effect requested by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Post a command to the editor
    Send(OutboundCommand),
    /// Write the normalized export to the record
    Persist(ExportResult),
    /// Show an informational notification
    Notify { title: String, message: String },
    /// Show a warning
    Warn { title: String, message: String },
    /// Close the hosting surface
    CloseSurface,
}

/// State machine of one editing session.
#[derive(Debug, Clone)]
pub struct SessionMachine {
    record_id: RecordId,
    document_name: String,
    initial_document: Option<String>,
    notification_title: String,
    state: SessionState,
    editor_ready: bool,
    pending_load: Option<OutboundCommand>,
    load_sent: bool,
    pending_export_format: Option<ExportFormat>,
}

impl SessionMachine {
    /// Creates a machine in `Opening` for `record_id`.
    pub fn new(record_id: RecordId, config: &EditorConfig) -> Self {
        Self {
            record_id,
            document_name: config.default_document_name.clone(),
            initial_document: None,
            notification_title: config.notification_title.clone(),
            state: SessionState::Opening,
            editor_ready: false,
            pending_load: None,
            load_sent: false,
            pending_export_format: None,
        }
    }

    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub fn initial_document(&self) -> Option<&str> {
        self.initial_document.as_deref()
    }

    /// Format of the export currently requested from the editor, if any.
    pub fn pending_export_format(&self) -> Option<ExportFormat> {
        self.pending_export_format
    }

    /// Returns true once the single `load` has been dispatched.
    pub fn load_sent(&self) -> bool {
        self.load_sent
    }

    /// Returns true while a `load` is buffered waiting for the editor.
    pub fn awaiting_readiness(&self) -> bool {
        self.pending_load.is_some()
    }

    /// The record read finished; prepares the single `load`.
    ///
    /// The `load` goes out immediately if the editor already reported `init`,
    /// otherwise it is buffered until `init` or the readiness fallback. The
    /// returned directives must be applied like those of any other input.
    pub fn record_loaded(&mut self, record: DiagramRecord) -> Vec<Directive> {
        if self.state != SessionState::Opening || self.load_sent || self.pending_load.is_some() {
            return Vec::new();
        }

        self.document_name = record.name_or(&self.document_name).to_string();
        self.initial_document = record.document().map(str::to_string);
        self.pending_load = Some(OutboundCommand::load(
            self.initial_document.as_deref(),
            self.document_name.clone(),
        ));

        if self.editor_ready {
            self.flush_load()
        } else {
            Vec::new()
        }
    }

    /// The record could not be read; the session cannot start.
    pub fn record_unavailable(&mut self, error: &BridgeError) -> Vec<Directive> {
        if self.state != SessionState::Opening {
            return Vec::new();
        }

        let reason = error.user_message();
        self.state = SessionState::Failed {
            reason: reason.clone(),
        };
        vec![self.warn(format!("Could not open diagram: {reason}"))]
    }

    /// The readiness fallback elapsed without an `init` event.
    ///
    /// The editor is assumed ready and a buffered `load` is sent.
    pub fn readiness_elapsed(&mut self) -> Vec<Directive> {
        if self.state != SessionState::Opening {
            return Vec::new();
        }

        self.editor_ready = true;
        self.flush_load()
    }

    /// Applies an event received from the editor.
    pub fn on_event(&mut self, event: InboundEvent) -> Vec<Directive> {
        match event {
            InboundEvent::Init => {
                self.editor_ready = true;
                if self.state == SessionState::Opening {
                    self.flush_load()
                } else {
                    Vec::new()
                }
            }
            InboundEvent::Save => {
                if self.state == SessionState::AwaitingUser {
                    self.request_export()
                } else {
                    Vec::new()
                }
            }
            InboundEvent::Export(payload) => {
                if self.state != SessionState::Exporting {
                    tracing::debug!(
                        record_id = %self.record_id,
                        state = self.state.name(),
                        "ignoring export outside of an export request"
                    );
                    return Vec::new();
                }

                self.pending_export_format = None;
                self.state = SessionState::Saving { failure: None };
                vec![Directive::Persist(export::normalize(&payload))]
            }
            InboundEvent::Autosave | InboundEvent::Exit | InboundEvent::Unknown => Vec::new(),
        }
    }

    /// Host-initiated save (the dialog's own save button).
    ///
    /// Also retries after a failed write.
    pub fn commit(&mut self) -> Vec<Directive> {
        match self.state {
            SessionState::AwaitingUser | SessionState::Saving { failure: Some(_) } => {
                self.request_export()
            }
            _ => Vec::new(),
        }
    }

    /// The record write succeeded.
    pub fn save_succeeded(&mut self) -> Vec<Directive> {
        if !self.state.is_saving() {
            return Vec::new();
        }

        self.state = SessionState::Closed;
        vec![
            Directive::Notify {
                title: self.notification_title.clone(),
                message: SAVED_MESSAGE.to_string(),
            },
            Directive::CloseSurface,
        ]
    }

    /// The record write failed. The session stays in `Saving` for a retry.
    pub fn save_failed(&mut self, error: &BridgeError) -> Vec<Directive> {
        if !self.state.is_saving() {
            return Vec::new();
        }

        let reason = error.user_message();
        self.state = SessionState::Saving {
            failure: Some(reason.clone()),
        };
        vec![self.warn(format!("Save failed: {reason}"))]
    }

    /// The editor did not answer an export request in time.
    pub fn export_timed_out(&mut self) -> Vec<Directive> {
        if self.state != SessionState::Exporting {
            return Vec::new();
        }

        let reason = "the editor did not respond to the export request".to_string();
        self.pending_export_format = None;
        self.state = SessionState::Failed {
            reason: reason.clone(),
        };
        vec![self.warn(format!("Export timed out: {reason}"))]
    }

    /// Host teardown from any state, `Failed` included. No persistence is
    /// attempted.
    pub fn close(&mut self) {
        self.pending_load = None;
        self.pending_export_format = None;
        self.state = SessionState::Closed;
    }

    fn flush_load(&mut self) -> Vec<Directive> {
        match self.pending_load.take() {
            Some(load) => {
                self.load_sent = true;
                self.state = SessionState::AwaitingUser;
                vec![Directive::Send(load)]
            }
            None => Vec::new(),
        }
    }

    fn request_export(&mut self) -> Vec<Directive> {
        self.state = SessionState::Exporting;
        self.pending_export_format = Some(SESSION_EXPORT_FORMAT);
        vec![Directive::Send(OutboundCommand::request_export(
            SESSION_EXPORT_FORMAT,
        ))]
    }

    fn warn(&self, message: String) -> Directive {
        Directive::Warn {
            title: self.notification_title.clone(),
            message,
        }
    }
}
