//! Clipstack - Shared engine state
//!
//! Everything the poller, the restore path and commands mutate, kept behind one lock.

use crate::clipboard::ReentrancyGuard;
use crate::storage::HistoryStore;

/// Content last known to be on the clipboard; text and image are mutually exclusive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastSeenSnapshot {
    last_text: Option<String>,
    last_image: Option<Vec<u8>>,
}

impl LastSeenSnapshot {
    pub fn set_text(&mut self, text: String) {
        self.last_text = Some(text);
        self.last_image = None;
    }

    pub fn set_image(&mut self, data: Vec<u8>) {
        self.last_image = Some(data);
        self.last_text = None;
    }

    pub fn last_text(&self) -> Option<&str> {
        self.last_text.as_deref()
    }

    pub fn last_image(&self) -> Option<&[u8]> {
        self.last_image.as_deref()
    }

    pub fn text_changed(&self, text: &str) -> bool {
        self.last_text.as_deref() != Some(text)
    }

    pub fn image_changed(&self, data: &[u8]) -> bool {
        self.last_image.as_deref() != Some(data)
    }
}

/// Engine state guarded by the engine lock
#[derive(Debug)]
pub struct EngineState {
    pub history: HistoryStore,
    pub last_seen: LastSeenSnapshot,
    pub guard: ReentrancyGuard,
    pub paused: bool,
}

impl EngineState {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: HistoryStore::new(capacity),
            last_seen: LastSeenSnapshot::default(),
            guard: ReentrancyGuard::new(),
            paused: false,
        }
    }
}
