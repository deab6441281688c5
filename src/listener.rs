//! Listener registry and subscription tokens.
//!
//! Listeners are notified after every applied transition. Notification
//! iterates over a snapshot of the registry taken at notification start, so
//! a listener removed mid-pass still runs in that pass and a listener added
//! mid-pass first runs in the next one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Callback = Arc<dyn Fn() + Send + Sync>;

struct ListenerEntry {
    id: u64,
    callback: Callback,
}

/// Registered listeners, in subscription order.
pub(crate) struct ListenerRegistry {
    entries: Mutex<Vec<ListenerEntry>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Adds a listener and returns the id that removes it again.
    pub(crate) fn insert(&self, listener: impl Fn() + Send + Sync + 'static) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries.lock().push(ListenerEntry {
            id,
            callback: Arc::new(listener),
        });
        id
    }

    /// Runs every listener registered at the time of the call.
    ///
    /// The registry lock is released before any listener runs, so listeners
    /// are free to subscribe, unsubscribe or dispatch re-entrantly.
    pub(crate) fn notify(&self) {
        let snapshot: Vec<Callback> = self
            .entries
            .lock()
            .iter()
            .map(|entry| Arc::clone(&entry.callback))
            .collect();
        for callback in snapshot {
            callback();
        }
    }

    fn remove(&self, id: u64) {
        self.entries.lock().retain(|entry| entry.id != id);
    }
}

/// Token returned by `Store::subscribe`.
///
/// The listener stays registered until [`Subscription::unsubscribe`] is
/// called; dropping the token does not remove it. The token is keyed by id,
/// not position, so removing the first subscriber works the same as any
/// other and double removal is a no-op.
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<ListenerRegistry>,
    id: u64,
}

impl Subscription {
    pub(crate) fn new(registry: Weak<ListenerRegistry>, id: u64) -> Self {
        Self { registry, id }
    }

    /// Removes the listener this token was issued for.
    ///
    /// Safe to call while a notification pass is running; the current pass
    /// still invokes the listener, later passes do not.
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}
