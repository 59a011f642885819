//! Clipstack - Clipboard module
//!
//! Provides clipboard access, content classification and change monitoring

pub mod backend;
pub mod classifier;
pub mod guard;
pub mod models;
pub mod monitor;

pub use backend::{create_backend, ArboardBackend, BackendKind, ClipboardBackend, XclipBackend};
pub use classifier::{ContentClassifier, ValidatedImage};
pub use guard::ReentrancyGuard;
pub use models::{ClipboardItem, ClipboardItemView, ContentType, ImageFormat};
pub use monitor::{ClipboardPoller, PollOutcome};
