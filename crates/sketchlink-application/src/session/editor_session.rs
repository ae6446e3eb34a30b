use std::sync::Arc;

use sketchlink_core::config::EditorConfig;
use sketchlink_core::error::{BridgeError, Result};
use sketchlink_core::host::{HostingSurface, NotificationSink};
use sketchlink_core::protocol::{ChannelAdapter, EditorPort};
use sketchlink_core::record::{RecordAccessor, RecordId};
use sketchlink_core::session::{Directive, MISSING_RECORD_MESSAGE, SessionMachine, SessionState};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::driver::{Control, SessionDriver};
use crate::message_bus::MessageBus;

/// What the host knows when the editor is opened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchContext {
    /// Record currently shown by the host, if any
    pub active_record_id: Option<RecordId>,
}

impl LaunchContext {
    pub fn for_record(record_id: impl Into<RecordId>) -> Self {
        Self {
            active_record_id: Some(record_id.into()),
        }
    }
}

/// Collaborators of one session.
#[derive(Clone)]
pub struct SessionDeps {
    pub records: Arc<dyn RecordAccessor>,
    pub notifier: Arc<dyn NotificationSink>,
    pub surface: Arc<dyn HostingSurface>,
    pub port: Arc<dyn EditorPort>,
    pub config: EditorConfig,
}

/// Entry point for editing sessions.
pub struct EditorSession;

impl EditorSession {
    /// Opens a session for the context's active record.
    ///
    /// The listener is registered before the record is read so an `init`
    /// sent while the read is in flight is not lost.
    ///
    /// # Errors
    ///
    /// - `MissingContext` when no record is active. One warning is shown and
    ///   nothing is sent to the editor.
    /// - The record accessor's error when the record cannot be read. One
    ///   warning is shown and the listener is released.
    pub async fn open(
        context: LaunchContext,
        deps: SessionDeps,
        bus: &MessageBus,
    ) -> Result<SessionHandle> {
        let Some(record_id) = context.active_record_id else {
            tracing::warn!("editor opened without an active record");
            deps.notifier
                .warn(&deps.config.notification_title, MISSING_RECORD_MESSAGE);
            return Err(BridgeError::missing_context(MISSING_RECORD_MESSAGE));
        };

        let (listener, inbound) = bus.subscribe();
        let mut machine = SessionMachine::new(record_id.clone(), &deps.config);

        let record = match deps.records.read(&record_id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(record_id = %record_id, error = %e, "failed to read record");
                for directive in machine.record_unavailable(&e) {
                    if let Directive::Warn { title, message } = directive {
                        deps.notifier.warn(&title, &message);
                    }
                }
                return Err(e);
            }
        };

        let startup = machine.record_loaded(record);

        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(machine.state().clone());
        let cancel = CancellationToken::new();

        let driver = SessionDriver {
            machine,
            startup,
            adapter: ChannelAdapter::with_port(deps.port),
            records: deps.records,
            notifier: deps.notifier,
            surface: deps.surface,
            inbound,
            control: control_rx,
            state: state_tx,
            cancel: cancel.clone(),
            fallback_delay: deps.config.load_fallback_delay(),
            export_timeout: deps.config.export_timeout(),
            listener,
        };

        tracing::info!(record_id = %record_id, "editor session opened");
        let span = tracing::info_span!("editor_session", record_id = %record_id);
        let task = tokio::spawn(driver.run().instrument(span));

        Ok(SessionHandle {
            record_id,
            control: control_tx,
            state: state_rx,
            cancel,
            task: Some(task),
        })
    }
}

/// Host-side handle of a running session.
///
/// Dropping the handle tears the session down.
#[derive(Debug)]
pub struct SessionHandle {
    record_id: RecordId,
    control: mpsc::UnboundedSender<Control>,
    state: watch::Receiver<SessionState>,
    cancel: CancellationToken,
    task: Option<JoinHandle<SessionState>>,
}

impl SessionHandle {
    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    /// Host save button. Also retries after a failed write.
    pub fn commit(&self) {
        if self.control.send(Control::Commit).is_err() {
            tracing::debug!(record_id = %self.record_id, "commit after session ended");
        }
    }

    /// Dialog dismissed. Any in-flight write is left to finish unobserved.
    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    /// Latest published state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Waits until the session state satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the session ended in a state that does not
    /// satisfy `predicate`.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<SessionState>
    where
        F: FnMut(&SessionState) -> bool,
    {
        let mut state = self.state.clone();
        state
            .wait_for(|s| predicate(s))
            .await
            .map(|s| s.clone())
            .map_err(|_| {
                BridgeError::internal(format!(
                    "Session ended in state '{}'",
                    self.state.borrow().name()
                ))
            })
    }

    /// Waits for the session to end and returns its final state.
    pub async fn join(mut self) -> SessionState {
        let Some(task) = self.task.take() else {
            return self.state();
        };

        match task.await {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(record_id = %self.record_id, error = %e, "session task failed");
                SessionState::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
