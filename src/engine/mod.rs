//! Clipstack - Engine module
//!
//! Owns the shared state and is the only place it is mutated. The poller, the restore
//! path and presentation commands all go through the same lock instance.

pub mod events;
pub mod restore;
pub mod state;

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tokio::sync::watch;

use crate::clipboard::{ClipboardBackend, ClipboardItem, ContentClassifier};
use crate::config::Settings;
use crate::error::EngineError;
use crate::storage::{HistorySnapshot, InsertOutcome};

pub use events::{reveal_channel, Reveal, RevealReceiver, RevealSender};
pub use state::{EngineState, LastSeenSnapshot};

struct Inner {
    state: Mutex<EngineState>,
    backend: Arc<dyn ClipboardBackend>,
    classifier: ContentClassifier,
    history_tx: watch::Sender<HistorySnapshot>,
}

/// Clipboard history engine (cheap to clone, all clones share state)
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Inner>,
}

impl Engine {
    pub fn new(settings: &Settings, backend: Arc<dyn ClipboardBackend>) -> Self {
        let state = EngineState::new(settings.history_capacity);
        let (history_tx, _) = watch::channel(state.history.snapshot());
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                backend,
                classifier: ContentClassifier::from_settings(settings),
                history_tx,
            }),
        }
    }

    pub fn backend(&self) -> &dyn ClipboardBackend {
        self.inner.backend.as_ref()
    }

    pub fn classifier(&self) -> &ContentClassifier {
        &self.inner.classifier
    }

    /// Latest-value stream of history snapshots
    pub fn subscribe(&self) -> watch::Receiver<HistorySnapshot> {
        self.inner.history_tx.subscribe()
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        self.lock().history.snapshot()
    }

    pub fn last_seen(&self) -> LastSeenSnapshot {
        self.lock().last_seen.clone()
    }

    pub fn is_guard_active(&self) -> bool {
        self.lock().guard.is_active()
    }

    /// Clear the re-entrancy guard once the grace interval has passed
    pub fn release_guard(&self) {
        self.lock().guard.release();
    }

    pub fn pause(&self) {
        self.lock().paused = true;
        log::info!("[Engine] Monitoring paused");
    }

    pub fn resume(&self) {
        self.lock().paused = false;
        log::info!("[Engine] Monitoring resumed");
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    /// Insert a captured item unless an equal one exists
    pub fn capture(&self, item: ClipboardItem) -> InsertOutcome {
        let mut state = self.lock();
        self.capture_locked(&mut state, item)
    }

    /// Delete the entry at `index`
    pub fn remove(&self, index: usize) -> Result<HistorySnapshot, EngineError> {
        let mut state = self.lock();
        state.history.remove(index)?;
        log::info!("[History] Removed entry {}", index);
        Ok(self.publish_locked(&state))
    }

    /// Delete every entry
    pub fn clear(&self) -> HistorySnapshot {
        let mut state = self.lock();
        let removed = state.history.clear();
        log::info!("[History] Cleared {} entries", removed);
        self.publish_locked(&state)
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.inner.state.lock()
    }

    pub(crate) fn capture_locked(&self, state: &mut EngineState, item: ClipboardItem) -> InsertOutcome {
        let content_type = item.content_type();
        let outcome = state.history.insert_if_absent(item);
        if let InsertOutcome::Inserted { evicted } = &outcome {
            log::info!(
                "[History] Captured new {} entry ({} / {})",
                content_type.as_str(),
                state.history.len(),
                state.history.capacity()
            );
            if let Some(evicted) = evicted {
                log::debug!("[History] Evicted oldest entry (hash: {})", &evicted.hash()[..8]);
            }
            self.publish_locked(state);
        }
        outcome
    }

    /// Publish the current history while the lock is still held, so
    /// subscribers observe versions in mutation order.
    pub(crate) fn publish_locked(&self, state: &EngineState) -> HistorySnapshot {
        let snapshot = state.history.snapshot();
        self.inner.history_tx.send_replace(snapshot.clone());
        snapshot
    }
}
