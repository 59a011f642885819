//! Clipstack - Clipboard monitoring module
//!
//! Polls the clipboard on a fixed period and captures new content into history

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::models::ClipboardItem;
use crate::config::Settings;
use crate::engine::Engine;
use crate::storage::InsertOutcome;

/// What a single poll iteration did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The engine's own write may still be propagating; detection skipped
    GuardActive,
    /// Monitoring is paused
    Paused,
    /// Clipboard content matches what was last seen
    Unchanged,
    /// New content that already exists in history
    Duplicate,
    /// New content added to history
    Captured,
}

impl From<InsertOutcome> for PollOutcome {
    fn from(outcome: InsertOutcome) -> Self {
        match outcome {
            InsertOutcome::Inserted { .. } => PollOutcome::Captured,
            InsertOutcome::Duplicate => PollOutcome::Duplicate,
        }
    }
}

/// Clipboard poller
#[derive(Clone)]
pub struct ClipboardPoller {
    engine: Engine,
    /// Polling interval
    poll_interval: Duration,
    /// Grace interval after the engine's own write
    guard_grace: Duration,
}

impl ClipboardPoller {
    pub fn new(engine: Engine, poll_interval: Duration, guard_grace: Duration) -> Self {
        Self {
            engine,
            poll_interval,
            guard_grace,
        }
    }

    pub fn from_settings(engine: Engine, settings: &Settings) -> Self {
        Self::new(engine, settings.poll_interval(), settings.guard_grace())
    }

    /// Run detection once
    ///
    /// The engine lock is held from the guard check through the insert, so a
    /// restore cannot start writing between them.
    pub fn poll_once(&self) -> PollOutcome {
        let mut state = self.engine.lock();
        if state.paused {
            return PollOutcome::Paused;
        }
        if state.guard.is_active() {
            return PollOutcome::GuardActive;
        }

        let backend = self.engine.backend();
        let classifier = self.engine.classifier();

        // 1. Text takes priority
        let text = match backend.read_text() {
            Ok(raw) => classifier.classify_text(raw),
            Err(e) => {
                log::error!("[Monitor] Error getting clipboard text: {}", e);
                None
            }
        };
        if let Some(text) = text {
            if state.last_seen.text_changed(&text) {
                log::debug!("[Monitor] New text detected ({} bytes)", text.len());
                state.last_seen.set_text(text.clone());
                let outcome = self.engine.capture_locked(&mut state, ClipboardItem::new_text(text));
                return outcome.into();
            }
        }

        // 2. Then images
        if let Some(image) = classifier.read_image(backend) {
            if state.last_seen.image_changed(&image.data) {
                log::debug!("[Monitor] New image detected: {} ({} bytes)", image.format, image.data.len());
                state.last_seen.set_image(image.data.clone());
                let outcome = self.engine.capture_locked(&mut state, ClipboardItem::new_image(image.data));
                return outcome.into();
            }
        }

        PollOutcome::Unchanged
    }

    /// Poll until `token` is cancelled
    pub async fn run(self, token: CancellationToken) {
        log::info!(
            "Clipboard monitor started with {}ms interval ({} backend)",
            self.poll_interval.as_millis(),
            self.engine.backend().name()
        );

        while !token.is_cancelled() {
            let poller = self.clone();
            let outcome = match tokio::task::spawn_blocking(move || poller.poll_once()).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!("[Monitor] Poll iteration failed: {}", e);
                    PollOutcome::Unchanged
                }
            };

            if outcome == PollOutcome::GuardActive {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(self.guard_grace) => {}
                }
                self.engine.release_guard();
                continue;
            }

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        log::info!("Clipboard monitor stopped");
    }
}
