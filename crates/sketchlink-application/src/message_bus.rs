//! Process-wide message bus.
//!
//! Stands in for the window-level message event source that every editor
//! frame posts to. The bus is shared by all sessions and may carry traffic
//! that belongs to none of them, so each session filters what it receives.
//! Listeners are scoped: a subscription lives exactly as long as its
//! [`ListenerGuard`].

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc;

static GLOBAL_BUS: Lazy<MessageBus> = Lazy::new(MessageBus::new);

type ListenerMap = HashMap<u64, mpsc::UnboundedSender<String>>;

#[derive(Debug, Default)]
struct BusInner {
    listeners: Mutex<ListenerMap>,
    next_id: AtomicU64,
}

impl BusInner {
    fn lock(&self) -> MutexGuard<'_, ListenerMap> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fan-out bus of raw channel payloads.
#[derive(Debug, Clone, Default)]
pub struct MessageBus {
    inner: Arc<BusInner>,
}

impl MessageBus {
    /// Creates an isolated bus (tests, or hosts running several windows).
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide bus.
    pub fn global() -> &'static MessageBus {
        &GLOBAL_BUS
    }

    /// Registers a listener.
    ///
    /// The listener stays registered until the returned guard is dropped.
    pub fn subscribe(&self) -> (ListenerGuard, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.lock().insert(id, tx);
        tracing::debug!(listener_id = id, "registered message listener");

        let guard = ListenerGuard {
            id,
            bus: Arc::downgrade(&self.inner),
        };
        (guard, rx)
    }

    /// Delivers `raw` to every registered listener.
    ///
    /// Returns the number of listeners that received it.
    pub fn publish(&self, raw: impl Into<String>) -> usize {
        let raw = raw.into();
        let listeners = self.inner.lock();
        listeners
            .values()
            .filter(|tx| tx.send(raw.clone()).is_ok())
            .count()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.lock().len()
    }
}

/// Keeps one bus subscription alive. Dropping it deregisters the listener.
#[derive(Debug)]
pub struct ListenerGuard {
    id: u64,
    bus: Weak<BusInner>,
}

impl ListenerGuard {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            if bus.lock().remove(&self.id).is_some() {
                tracing::debug!(listener_id = self.id, "released message listener");
            }
        }
    }
}
