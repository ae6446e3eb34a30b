use async_trait::async_trait;
use sketchlink_application::{EditorSession, LaunchContext, MessageBus, SessionDeps};
use sketchlink_core::config::EditorConfig;
use sketchlink_core::error::{BridgeError, Result};
use sketchlink_core::export::ExportResult;
use sketchlink_core::host::{HostingSurface, NotificationSink};
use sketchlink_core::protocol::EditorPort;
use sketchlink_core::record::{DiagramRecord, RecordAccessor, RecordId};
use sketchlink_core::session::{MISSING_RECORD_MESSAGE, SAVED_MESSAGE, SessionState};
use sketchlink_infrastructure::InMemoryRecordAccessor;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Notify, Semaphore};

const INIT: &str = r#"{"event":"init"}"#;
const SAVE: &str = r#"{"event":"save"}"#;

fn export_message(xml: &str, data: &str) -> String {
    serde_json::json!({ "event": "export", "xml": xml, "data": data }).to_string()
}

#[derive(Default)]
struct RecordingPort {
    posted: Mutex<Vec<String>>,
}

impl RecordingPort {
    fn posted(&self) -> Vec<serde_json::Value> {
        self.posted
            .lock()
            .unwrap()
            .iter()
            .map(|raw| serde_json::from_str(raw).unwrap())
            .collect()
    }
}

impl EditorPort for RecordingPort {
    fn post(&self, payload: &str) {
        self.posted.lock().unwrap().push(payload.to_string());
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<(String, String)>>,
    warnings: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    fn notices(&self) -> Vec<(String, String)> {
        self.notices.lock().unwrap().clone()
    }

    fn warnings(&self) -> Vec<(String, String)> {
        self.warnings.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }

    fn warn(&self, title: &str, message: &str) {
        self.warnings
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }
}

#[derive(Default)]
struct RecordingSurface {
    closed: AtomicUsize,
}

impl HostingSurface for RecordingSurface {
    fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Accessor whose writes can fail or wait on a gate.
struct ScriptedAccessor {
    inner: InMemoryRecordAccessor,
    fail_writes: bool,
    gate: Option<Arc<Semaphore>>,
    attempts: AtomicUsize,
    finished: Notify,
}

impl ScriptedAccessor {
    async fn with_record(document: Option<&str>) -> Self {
        let inner = InMemoryRecordAccessor::new();
        inner
            .insert(42u64, DiagramRecord::new(document.map(str::to_string), None))
            .await;
        Self {
            inner,
            fail_writes: false,
            gate: None,
            attempts: AtomicUsize::new(0),
            finished: Notify::new(),
        }
    }

    fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordAccessor for ScriptedAccessor {
    async fn read(&self, record_id: &RecordId) -> Result<DiagramRecord> {
        self.inner.read(record_id).await
    }

    async fn write(&self, record_id: &RecordId, export: &ExportResult) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.unwrap();
        }
        let result = if self.fail_writes {
            Err(BridgeError::transport("connection reset"))
        } else {
            self.inner.write(record_id, export).await
        };
        self.finished.notify_one();
        result
    }
}

struct Fixture {
    bus: MessageBus,
    records: Arc<ScriptedAccessor>,
    port: Arc<RecordingPort>,
    notifier: Arc<RecordingNotifier>,
    surface: Arc<RecordingSurface>,
    config: EditorConfig,
}

impl Fixture {
    async fn new() -> Self {
        Self::with_accessor(ScriptedAccessor::with_record(Some("<mxGraph/>")).await)
    }

    fn with_accessor(records: ScriptedAccessor) -> Self {
        Self {
            bus: MessageBus::new(),
            records: Arc::new(records),
            port: Arc::new(RecordingPort::default()),
            notifier: Arc::new(RecordingNotifier::default()),
            surface: Arc::new(RecordingSurface::default()),
            config: EditorConfig::default(),
        }
    }

    fn deps(&self) -> SessionDeps {
        SessionDeps {
            records: self.records.clone(),
            notifier: self.notifier.clone(),
            surface: self.surface.clone(),
            port: self.port.clone(),
            config: self.config.clone(),
        }
    }

    fn closed(&self) -> usize {
        self.surface.closed.load(Ordering::SeqCst)
    }
}

fn is_awaiting(state: &SessionState) -> bool {
    *state == SessionState::AwaitingUser
}

fn is_exporting(state: &SessionState) -> bool {
    *state == SessionState::Exporting
}

#[tokio::test]
async fn test_full_save_scenario() {
    let fixture = Fixture::new().await;
    let handle = EditorSession::open(LaunchContext::for_record(42u64), fixture.deps(), &fixture.bus)
        .await
        .unwrap();
    assert_eq!(handle.record_id(), &RecordId::new("42"));

    fixture.bus.publish(INIT);
    handle.wait_for(is_awaiting).await.unwrap();

    let posted = fixture.port.posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0]["action"], "load");
    assert_eq!(posted[0]["autosave"], 1);
    assert_eq!(posted[0]["xml"], "<mxGraph/>");
    assert_eq!(posted[0]["title"], "diagram.drawio");

    fixture.bus.publish(SAVE);
    handle.wait_for(is_exporting).await.unwrap();

    let posted = fixture.port.posted();
    assert_eq!(posted.len(), 2);
    assert_eq!(posted[1]["action"], "export");
    assert_eq!(posted[1]["format"], "xmlpng");

    fixture
        .bus
        .publish(export_message("<mxGraph><root/></mxGraph>", "data:image/png;base64,QUJD"));
    assert_eq!(handle.join().await, SessionState::Closed);

    let stored = fixture.records.inner.get(&RecordId::new("42")).await.unwrap();
    assert_eq!(stored.record.document(), Some("<mxGraph><root/></mxGraph>"));
    assert_eq!(stored.image.as_deref(), Some("QUJD"));

    assert_eq!(
        fixture.notifier.notices(),
        vec![("Draw.io".to_string(), SAVED_MESSAGE.to_string())]
    );
    assert!(fixture.notifier.warnings().is_empty());
    assert_eq!(fixture.closed(), 1);
    assert_eq!(fixture.bus.listener_count(), 0);
}

#[tokio::test]
async fn test_duplicate_init_sends_single_load() {
    let fixture = Fixture::new().await;
    let handle = EditorSession::open(LaunchContext::for_record(42u64), fixture.deps(), &fixture.bus)
        .await
        .unwrap();

    fixture.bus.publish(INIT);
    fixture.bus.publish(INIT);
    handle.commit();
    handle.wait_for(is_exporting).await.unwrap();

    let actions: Vec<_> = fixture
        .port
        .posted()
        .iter()
        .map(|m| m["action"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(actions, vec!["load", "export"]);
    handle.teardown();
    assert_eq!(handle.join().await, SessionState::Closed);
}

#[tokio::test]
async fn test_write_failure_warns_once_and_allows_retry() {
    let mut accessor = ScriptedAccessor::with_record(Some("<mxGraph/>")).await;
    accessor.fail_writes = true;
    let fixture = Fixture::with_accessor(accessor);

    let handle = EditorSession::open(LaunchContext::for_record(42u64), fixture.deps(), &fixture.bus)
        .await
        .unwrap();
    fixture.bus.publish(INIT);
    fixture.bus.publish(SAVE);
    handle.wait_for(is_exporting).await.unwrap();
    fixture.bus.publish(export_message("<mxGraph/>", "QUJD"));

    let state = handle
        .wait_for(|s| s.save_failure().is_some())
        .await
        .unwrap();
    assert_eq!(state.save_failure(), Some("connection reset"));
    assert_eq!(
        fixture.notifier.warnings(),
        vec![("Draw.io".to_string(), "Save failed: connection reset".to_string())]
    );

    // A repeated export or editor save while saving does nothing
    fixture.bus.publish(export_message("<mxGraph/>", "QUJD"));
    fixture.bus.publish(SAVE);
    handle.commit();
    handle.wait_for(is_exporting).await.unwrap();

    assert_eq!(fixture.records.attempts(), 1);
    assert_eq!(fixture.port.posted().len(), 3);
    assert!(fixture.notifier.notices().is_empty());
    assert_eq!(fixture.closed(), 0);

    handle.teardown();
    assert_eq!(handle.join().await, SessionState::Closed);
    assert_eq!(fixture.notifier.warnings().len(), 1);
}

#[tokio::test]
async fn test_missing_record_context() {
    let fixture = Fixture::new().await;

    let err = EditorSession::open(LaunchContext::default(), fixture.deps(), &fixture.bus)
        .await
        .unwrap_err();

    assert!(err.is_missing_context());
    assert_eq!(
        fixture.notifier.warnings(),
        vec![("Draw.io".to_string(), MISSING_RECORD_MESSAGE.to_string())]
    );
    assert!(fixture.port.posted().is_empty());
    assert_eq!(fixture.bus.listener_count(), 0);
}

#[tokio::test]
async fn test_unreadable_record_warns_and_releases_listener() {
    let fixture = Fixture::new().await;

    let err = EditorSession::open(LaunchContext::for_record("7"), fixture.deps(), &fixture.bus)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    let warnings = fixture.notifier.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].1.starts_with("Could not open diagram:"));
    assert!(fixture.port.posted().is_empty());
    assert_eq!(fixture.bus.listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_readiness_fallback_sends_single_load() {
    let fixture = Fixture::new().await;
    let handle = EditorSession::open(LaunchContext::for_record(42u64), fixture.deps(), &fixture.bus)
        .await
        .unwrap();

    // No init: the fallback timer flushes the load
    handle.wait_for(is_awaiting).await.unwrap();
    assert_eq!(fixture.port.posted().len(), 1);

    fixture.bus.publish(INIT);
    handle.commit();
    handle.wait_for(is_exporting).await.unwrap();

    let posted = fixture.port.posted();
    assert_eq!(posted.len(), 2);
    assert_eq!(posted[0]["action"], "load");
    assert_eq!(posted[1]["action"], "export");
}

#[tokio::test]
async fn test_unsolicited_export_and_foreign_traffic_are_ignored() {
    let fixture = Fixture::new().await;
    let handle = EditorSession::open(LaunchContext::for_record(42u64), fixture.deps(), &fixture.bus)
        .await
        .unwrap();
    fixture.bus.publish(INIT);
    handle.wait_for(is_awaiting).await.unwrap();

    fixture.bus.publish("hello");
    fixture.bus.publish("{not json");
    fixture.bus.publish(r#"{"event":"load"}"#);
    fixture.bus.publish(r#"{"event":"autosave","xml":"<x/>"}"#);
    fixture.bus.publish(export_message("<stale/>", "QUJD"));
    fixture.bus.publish(SAVE);
    handle.wait_for(is_exporting).await.unwrap();

    assert_eq!(fixture.records.attempts(), 0);
    assert_eq!(fixture.port.posted().len(), 2);

    drop(handle);
}

#[tokio::test]
async fn test_teardown_discards_late_write_result() {
    let mut accessor = ScriptedAccessor::with_record(Some("<mxGraph/>")).await;
    let gate = Arc::new(Semaphore::new(0));
    accessor.gate = Some(gate.clone());
    let fixture = Fixture::with_accessor(accessor);

    let handle = EditorSession::open(LaunchContext::for_record(42u64), fixture.deps(), &fixture.bus)
        .await
        .unwrap();
    fixture.bus.publish(INIT);
    handle.commit();
    handle.wait_for(is_exporting).await.unwrap();
    fixture.bus.publish(export_message("<late/>", "QUJD"));
    handle.wait_for(SessionState::is_saving).await.unwrap();

    handle.teardown();
    assert_eq!(handle.join().await, SessionState::Closed);
    assert_eq!(fixture.bus.listener_count(), 0);

    // The write still completes, but nobody is told about it
    gate.add_permits(1);
    fixture.records.finished.notified().await;

    assert_eq!(fixture.records.inner.write_count(), 1);
    assert!(fixture.notifier.notices().is_empty());
    assert!(fixture.notifier.warnings().is_empty());
    assert_eq!(fixture.closed(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_export_timeout_fails_session() {
    let mut fixture = Fixture::new().await;
    fixture.config.export_timeout_ms = Some(1_000);

    let handle = EditorSession::open(LaunchContext::for_record(42u64), fixture.deps(), &fixture.bus)
        .await
        .unwrap();
    fixture.bus.publish(INIT);
    handle.commit();

    let state = handle.join().await;
    assert!(matches!(state, SessionState::Failed { .. }));

    let warnings = fixture.notifier.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].1.starts_with("Export timed out"));
    assert_eq!(fixture.records.attempts(), 0);
}

#[tokio::test]
async fn test_repeated_sessions_do_not_leak_listeners() {
    let fixture = Fixture::new().await;

    for _ in 0..3 {
        let handle =
            EditorSession::open(LaunchContext::for_record(42u64), fixture.deps(), &fixture.bus)
                .await
                .unwrap();
        assert_eq!(fixture.bus.listener_count(), 1);
        fixture.bus.publish(INIT);
        handle.wait_for(is_awaiting).await.unwrap();
        handle.teardown();
        assert_eq!(handle.join().await, SessionState::Closed);
    }

    assert_eq!(fixture.bus.listener_count(), 0);
    // Teardown never persists
    assert_eq!(fixture.records.attempts(), 0);
}

#[tokio::test]
async fn test_dropping_handle_tears_down() {
    let fixture = Fixture::new().await;
    let handle = EditorSession::open(LaunchContext::for_record(42u64), fixture.deps(), &fixture.bus)
        .await
        .unwrap();
    drop(handle);

    for _ in 0..10 {
        if fixture.bus.listener_count() == 0 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(fixture.bus.listener_count(), 0);
}
