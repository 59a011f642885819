//! Clipstack - Restore path
//!
//! Promotes a history entry and writes it back to the clipboard under the engine lock.

use super::Engine;
use crate::clipboard::{ClipboardItem, ContentType, ImageFormat};
use crate::error::{BackendError, EngineError};
use crate::storage::HistorySnapshot;

/// What actually went to the clipboard
enum Written {
    Text(String),
    Image(Vec<u8>),
}

impl Engine {
    /// Move entry `index` to head and restore it to the clipboard
    ///
    /// A failed clipboard write is logged and does not fail the call; only an
    /// invalid index does, in which case nothing changes.
    pub fn request_promote(&self, index: usize) -> Result<HistorySnapshot, EngineError> {
        let mut state = self.lock();
        let item = state.history.promote(index)?;
        let snapshot = self.publish_locked(&state);
        log::info!("[Restore] Promoted entry {} ({})", index, item.content_type().as_str());

        state.guard.engage();
        // On success the guard stays raised; the poller lowers it after the grace interval.
        match self.write_item(&item) {
            Ok(Written::Text(text)) => state.last_seen.set_text(text),
            Ok(Written::Image(png)) => state.last_seen.set_image(png),
            Err(e) => {
                // Nothing reached the clipboard, so there is nothing to absorb.
                state.guard.release();
                log::error!("[Restore] Failed to set clipboard content: {}", e);
            }
        }
        Ok(snapshot)
    }

    fn write_item(&self, item: &ClipboardItem) -> Result<Written, BackendError> {
        match item.content_type() {
            ContentType::Text => {
                let text = String::from_utf8_lossy(item.payload()).into_owned();
                self.backend().write_text(&text)?;
                Ok(Written::Text(text))
            }
            ContentType::Image => {
                let png = self.classifier().encode_png(item.payload())?;
                self.backend().write_image(&png, ImageFormat::Png)?;
                Ok(Written::Image(png))
            }
        }
    }
}
