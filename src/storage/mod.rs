//! Clipstack - Storage module
//!
//! In-memory history of captured clipboard content

pub mod history;

pub use history::{HistorySnapshot, HistoryStore, InsertOutcome, DEFAULT_CAPACITY};
