//! Clipstack - Presentation adapter module
//!
//! Bridges engine events to whatever renders them. The bundled presenter writes one
//! JSON object per line, so a UI process can drive clipstack over a pipe.

use std::io::Write;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::clipboard::ClipboardItemView;
use crate::engine::{Reveal, RevealReceiver};
use crate::storage::HistorySnapshot;

/// Consumer of engine events
pub trait PresentationAdapter: Send + Sync {
    fn on_history_changed(&self, snapshot: &HistorySnapshot);
    fn on_reveal(&self, x: i32, y: i32);
}

/// Event line written by [`JsonLinesPresenter`]
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PresenterEvent {
    HistoryChanged {
        version: u64,
        items: Vec<ClipboardItemView>,
    },
    Reveal(Reveal),
}

/// Writes events as JSON lines
pub struct JsonLinesPresenter<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn emit(&self, event: &PresenterEvent) {
        let mut out = self.out.lock();
        let written = serde_json::to_writer(&mut *out, event)
            .map_err(std::io::Error::from)
            .and_then(|_| out.write_all(b"\n"))
            .and_then(|_| out.flush());
        if let Err(e) = written {
            log::warn!("[Presenter] Failed to emit event: {}", e);
        }
    }
}

impl JsonLinesPresenter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> PresentationAdapter for JsonLinesPresenter<W> {
    fn on_history_changed(&self, snapshot: &HistorySnapshot) {
        self.emit(&PresenterEvent::HistoryChanged {
            version: snapshot.version(),
            items: snapshot.views(),
        });
    }

    fn on_reveal(&self, x: i32, y: i32) {
        self.emit(&PresenterEvent::Reveal(Reveal { x, y }));
    }
}

/// Forward engine events to `adapter` until cancelled
///
/// History changes are read from a latest-value channel: a slow adapter
/// skips intermediate snapshots but never sees them out of order.
pub async fn pump<A>(
    mut history: watch::Receiver<HistorySnapshot>,
    mut reveals: RevealReceiver,
    adapter: A,
    token: CancellationToken,
) where
    A: PresentationAdapter,
{
    let mut reveals_open = true;
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            changed = history.changed() => {
                if changed.is_err() {
                    log::debug!("[Presenter] History channel closed");
                    break;
                }
                let snapshot = history.borrow_and_update().clone();
                adapter.on_history_changed(&snapshot);
            }
            reveal = reveals.recv(), if reveals_open => match reveal {
                Some(Reveal { x, y }) => adapter.on_reveal(x, y),
                None => reveals_open = false,
            },
        }
    }
    log::debug!("[Presenter] Event pump stopped");
}
