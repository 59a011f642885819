//! Clipstack - Re-entrancy guard
//!
//! Suppresses change detection right after the engine wrote to the clipboard itself.
//! Lives inside the engine state, so every transition happens under the engine lock.

use std::time::Instant;

/// Raised while the engine's own write may still be propagating through the backend
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    updating_clipboard: bool,
    raised_at: Option<Instant>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise before issuing a write
    pub fn engage(&mut self) {
        self.updating_clipboard = true;
        self.raised_at = Some(Instant::now());
    }

    /// Lower after a failed write or once the grace interval has elapsed
    pub fn release(&mut self) {
        if self.updating_clipboard {
            log::debug!(
                "[Guard] Released after {:?}",
                self.raised_at.map(|t| t.elapsed()).unwrap_or_default()
            );
        }
        self.updating_clipboard = false;
        self.raised_at = None;
    }

    pub fn is_active(&self) -> bool {
        self.updating_clipboard
    }
}
