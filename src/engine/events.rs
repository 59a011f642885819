//! Clipstack - Reveal signal hand-off
//!
//! Bounded channel between the hotkey listener and the presenter. Sending never blocks:
//! when the presenter lags behind, new reveal signals are dropped.

use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Request to show the history near the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reveal {
    pub x: i32,
    pub y: i32,
}

pub type RevealReceiver = mpsc::Receiver<Reveal>;

/// Sending half used by the hotkey listener
#[derive(Debug, Clone)]
pub struct RevealSender {
    tx: mpsc::Sender<Reveal>,
}

impl RevealSender {
    /// Hand off a reveal; returns whether it was queued
    pub fn send(&self, reveal: Reveal) -> bool {
        match self.tx.try_send(reveal) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::warn!("[Reveal] Presenter is lagging, dropping reveal at ({}, {})", reveal.x, reveal.y);
                false
            }
            Err(TrySendError::Closed(_)) => {
                log::debug!("[Reveal] Presenter has shut down, dropping reveal");
                false
            }
        }
    }
}

/// Create a reveal channel holding at most `capacity` pending signals
pub fn reveal_channel(capacity: usize) -> (RevealSender, RevealReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (RevealSender { tx }, rx)
}
