//! Shared Tracker
//!
//! A cloneable handle for feeding one tracker from several threads. The
//! whole tracker sits behind a single lock: eviction reads every entry, so
//! there is no finer split that keeps batches ordered.

use parking_lot::Mutex;
use std::sync::Arc;

use super::events::AccessEvent;
use super::state::SessionRecord;
use super::tracker::{SessionTracker, TrackerResult};

#[derive(Debug, Clone)]
pub struct SharedTracker {
    inner: Arc<Mutex<SessionTracker>>,
}

impl SharedTracker {
    pub fn new(tracker: SessionTracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    /// Process one event under the lock
    pub fn process_event(&self, event: AccessEvent) -> TrackerResult<Vec<SessionRecord>> {
        self.inner.lock().process_event(event)
    }

    /// Flush all remaining sessions under the lock
    pub fn flush(&self) -> Vec<SessionRecord> {
        self.inner.lock().flush()
    }

    pub fn active_count(&self) -> usize {
        self.inner.lock().active_count()
    }
}
