//! Session driver task.
//!
//! Runs the state machine against real time and real collaborators: inbound
//! channel traffic, host controls, the readiness fallback, the export
//! deadline and record write completions all feed one `select!` loop.

use std::future::{self, Future};
use std::sync::Arc;
use std::time::Duration;

use sketchlink_core::error::Result;
use sketchlink_core::export::ExportResult;
use sketchlink_core::host::{HostingSurface, NotificationSink};
use sketchlink_core::protocol::ChannelAdapter;
use sketchlink_core::record::RecordAccessor;
use sketchlink_core::session::{Directive, SessionMachine, SessionState};
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::message_bus::ListenerGuard;

/// Requests from the host side of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Control {
    Commit,
}

enum Step {
    Teardown,
    Inbound(String),
    Control(Control),
    WriteFinished(Result<()>),
    ReadinessElapsed,
    ExportTimedOut,
}

pub(crate) struct SessionDriver {
    pub(crate) machine: SessionMachine,
    /// Directives produced before the driver took over
    pub(crate) startup: Vec<Directive>,
    pub(crate) adapter: ChannelAdapter,
    pub(crate) records: Arc<dyn RecordAccessor>,
    pub(crate) notifier: Arc<dyn NotificationSink>,
    pub(crate) surface: Arc<dyn HostingSurface>,
    pub(crate) inbound: mpsc::UnboundedReceiver<String>,
    pub(crate) control: mpsc::UnboundedReceiver<Control>,
    pub(crate) state: watch::Sender<SessionState>,
    pub(crate) cancel: CancellationToken,
    pub(crate) fallback_delay: Duration,
    pub(crate) export_timeout: Option<Duration>,
    /// Released when the driver ends, on every exit path
    pub(crate) listener: ListenerGuard,
}

impl SessionDriver {
    pub(crate) async fn run(mut self) -> SessionState {
        let (write_tx, mut write_rx) = mpsc::unbounded_channel::<Result<()>>();
        let fallback = time::sleep(self.fallback_delay);
        tokio::pin!(fallback);
        let mut export_deadline: Option<Instant> = None;

        tracing::debug!(
            record_id = %self.machine.record_id(),
            listener_id = self.listener.id(),
            "session driver started"
        );

        for directive in std::mem::take(&mut self.startup) {
            self.apply(directive, &write_tx);
        }
        self.publish_state();

        while !self.machine.state().is_terminal() {
            let awaiting_readiness = self.machine.awaiting_readiness();

            let step = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Step::Teardown,
                Some(result) = write_rx.recv() => Step::WriteFinished(result),
                Some(raw) = self.inbound.recv() => Step::Inbound(raw),
                Some(control) = self.control.recv() => Step::Control(control),
                _ = &mut fallback, if awaiting_readiness => Step::ReadinessElapsed,
                _ = deadline(export_deadline) => Step::ExportTimedOut,
                else => Step::Teardown,
            };

            let directives = match step {
                Step::Teardown => {
                    tracing::info!(record_id = %self.machine.record_id(), "session torn down");
                    self.machine.close();
                    Vec::new()
                }
                Step::Inbound(raw) => {
                    let event = self.adapter.receive(&raw);
                    if !event.is_unknown() {
                        tracing::debug!(event = event.name(), "editor event");
                    }
                    self.machine.on_event(event)
                }
                Step::Control(Control::Commit) => self.machine.commit(),
                Step::WriteFinished(Ok(())) => self.machine.save_succeeded(),
                Step::WriteFinished(Err(e)) => {
                    tracing::warn!(record_id = %self.machine.record_id(), error = %e, "record write failed");
                    self.machine.save_failed(&e)
                }
                Step::ReadinessElapsed => {
                    tracing::debug!(
                        delay_ms = self.fallback_delay.as_millis() as u64,
                        "no init from editor, assuming ready"
                    );
                    self.machine.readiness_elapsed()
                }
                Step::ExportTimedOut => {
                    tracing::warn!(record_id = %self.machine.record_id(), "export request timed out");
                    self.machine.export_timed_out()
                }
            };

            for directive in directives {
                self.apply(directive, &write_tx);
            }

            export_deadline = match (self.machine.state(), export_deadline) {
                (SessionState::Exporting, Some(at)) => Some(at),
                (SessionState::Exporting, None) => self.export_timeout.map(|t| Instant::now() + t),
                _ => None,
            };

            self.publish_state();
        }

        let final_state = self.machine.state().clone();
        tracing::info!(
            record_id = %self.machine.record_id(),
            state = %final_state,
            "editor session ended"
        );
        final_state
    }

    fn apply(&self, directive: Directive, write_tx: &mpsc::UnboundedSender<Result<()>>) {
        match directive {
            Directive::Send(command) => self.adapter.send(&command),
            Directive::Persist(export) => self.spawn_write(export, write_tx.clone()),
            Directive::Notify { title, message } => self.notifier.notify(&title, &message),
            Directive::Warn { title, message } => self.notifier.warn(&title, &message),
            Directive::CloseSurface => self.surface.close(),
        }
    }

    fn spawn_write(&self, export: ExportResult, results: mpsc::UnboundedSender<Result<()>>) {
        let records = Arc::clone(&self.records);
        let record_id = self.machine.record_id().clone();

        tokio::spawn(async move {
            let result = records.write(&record_id, &export).await;
            if results.send(result).is_err() {
                tracing::debug!(record_id = %record_id, "write finished after session ended");
            }
        });
    }

    fn publish_state(&self) {
        let next = self.machine.state();
        if *self.state.borrow() == *next {
            return;
        }

        let previous = self.state.send_replace(next.clone());
        tracing::info!(
            record_id = %self.machine.record_id(),
            from = previous.name(),
            to = next.name(),
            "session state changed"
        );
    }
}

fn deadline(at: Option<Instant>) -> impl Future<Output = ()> {
    async move {
        match at {
            Some(at) => time::sleep_until(at).await,
            None => future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message_bus::MessageBus;
    use sketchlink_core::config::EditorConfig;
    use sketchlink_core::protocol::{EditorPort, InboundEvent};
    use sketchlink_core::record::{DiagramRecord, RecordId};
    use sketchlink_infrastructure::InMemoryRecordAccessor;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPort {
        posted: Mutex<Vec<String>>,
    }

    impl EditorPort for RecordingPort {
        fn post(&self, payload: &str) {
            self.posted.lock().unwrap().push(payload.to_string());
        }
    }

    struct QuietHost;

    impl NotificationSink for QuietHost {
        fn notify(&self, _title: &str, _message: &str) {}
        fn warn(&self, _title: &str, _message: &str) {}
    }

    impl HostingSurface for QuietHost {
        fn close(&self) {}
    }

    #[tokio::test]
    async fn test_startup_directives_are_applied() {
        let mut machine = SessionMachine::new(RecordId::from(42u64), &EditorConfig::default());
        machine.on_event(InboundEvent::Init);
        let startup = machine.record_loaded(DiagramRecord::default());
        assert_eq!(startup.len(), 1);

        let bus = MessageBus::new();
        let (listener, inbound) = bus.subscribe();
        let (_control_tx, control) = mpsc::unbounded_channel();
        let (state, _state_rx) = watch::channel(SessionState::Opening);
        let cancel = CancellationToken::new();
        let port = Arc::new(RecordingPort::default());
        let host = Arc::new(QuietHost);

        let driver = SessionDriver {
            machine,
            startup,
            adapter: ChannelAdapter::with_port(port.clone()),
            records: Arc::new(InMemoryRecordAccessor::new()),
            notifier: host.clone(),
            surface: host,
            inbound,
            control,
            state,
            cancel: cancel.clone(),
            fallback_delay: Duration::from_secs(60),
            export_timeout: None,
            listener,
        };

        cancel.cancel();
        assert_eq!(driver.run().await, SessionState::Closed);

        let posted = port.posted.lock().unwrap();
        assert_eq!(posted.len(), 1);
        assert!(posted[0].starts_with(r#"{"action":"load""#));
        assert_eq!(bus.listener_count(), 0);
    }
}
