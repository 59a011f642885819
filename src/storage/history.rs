//! Clipstack - History store module
//!
//! Bounded, deduplicated, recency-ordered history of captured items (head = index 0)

use std::collections::VecDeque;
use std::sync::Arc;

use crate::clipboard::{ClipboardItem, ClipboardItemView};
use crate::error::EngineError;

/// Default number of retained entries
pub const DEFAULT_CAPACITY: usize = 25;

/// Result of an automatic capture
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// Inserted at head; carries the tail entry evicted to make room, if any
    Inserted { evicted: Option<Arc<ClipboardItem>> },
    /// An equal item already exists somewhere in history; nothing changed
    Duplicate,
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted { .. })
    }
}

/// Immutable copy of the history handed to presentation
#[derive(Debug, Clone, Default)]
pub struct HistorySnapshot {
    items: Vec<Arc<ClipboardItem>>,
    version: u64,
}

impl HistorySnapshot {
    pub fn items(&self) -> &[Arc<ClipboardItem>] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&ClipboardItem> {
        self.items.get(index).map(|item| item.as_ref())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Mutation counter at the time the snapshot was taken
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Text payloads in order, images rendered as `None`
    pub fn texts(&self) -> Vec<Option<&str>> {
        self.items.iter().map(|item| item.as_text()).collect()
    }

    pub fn views(&self) -> Vec<ClipboardItemView> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| ClipboardItemView::new(index, item))
            .collect()
    }
}

/// History store
#[derive(Debug)]
pub struct HistoryStore {
    items: VecDeque<Arc<ClipboardItem>>,
    capacity: usize,
    version: u64,
}

impl HistoryStore {
    /// Create an empty store; a zero capacity is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity + 1),
            capacity,
            version: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, index: usize) -> Option<&Arc<ClipboardItem>> {
        self.items.get(index)
    }

    /// Whether an equal item exists anywhere in history
    pub fn contains(&self, item: &ClipboardItem) -> bool {
        self.items.iter().any(|existing| existing.as_ref() == item)
    }

    /// Insert at head unless an equal item exists, evicting the tail beyond capacity
    pub fn insert_if_absent(&mut self, item: ClipboardItem) -> InsertOutcome {
        if self.contains(&item) {
            log::debug!("[History] Content already exists (hash: {}), skipping", &item.hash()[..8]);
            return InsertOutcome::Duplicate;
        }

        self.items.push_front(Arc::new(item));
        let mut evicted = None;
        while self.items.len() > self.capacity {
            evicted = self.items.pop_back();
        }
        self.version += 1;
        InsertOutcome::Inserted { evicted }
    }

    /// Move the item at `index` to head, preserving the order of the rest
    pub fn promote(&mut self, index: usize) -> Result<Arc<ClipboardItem>, EngineError> {
        let item = self.take(index)?;
        self.items.push_front(Arc::clone(&item));
        self.version += 1;
        Ok(item)
    }

    /// Delete the item at `index`
    pub fn remove(&mut self, index: usize) -> Result<Arc<ClipboardItem>, EngineError> {
        let item = self.take(index)?;
        self.version += 1;
        Ok(item)
    }

    /// Delete every item; returns how many were removed
    pub fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        self.version += 1;
        removed
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            items: self.items.iter().cloned().collect(),
            version: self.version,
        }
    }

    fn take(&mut self, index: usize) -> Result<Arc<ClipboardItem>, EngineError> {
        let len = self.items.len();
        self.items
            .remove(index)
            .ok_or(EngineError::IndexOutOfRange { index, len })
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> ClipboardItem {
        ClipboardItem::new_text(s)
    }

    fn texts(store: &HistoryStore) -> Vec<String> {
        store
            .snapshot()
            .texts()
            .into_iter()
            .map(|t| t.unwrap_or("<image>").to_string())
            .collect()
    }

    #[test]
    fn capacity_three_evicts_oldest() {
        let mut store = HistoryStore::new(3);
        for s in ["A", "B", "C"] {
            assert_eq!(store.insert_if_absent(text(s)), InsertOutcome::Inserted { evicted: None });
        }
        let outcome = store.insert_if_absent(text("D"));
        match outcome {
            InsertOutcome::Inserted { evicted: Some(item) } => assert_eq!(item.as_text(), Some("A")),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(texts(&store), ["D", "C", "B"]);
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let mut store = HistoryStore::new(5);
        for i in 0..40 {
            store.insert_if_absent(text(&format!("item-{}", i % 13)));
            assert!(store.len() <= store.capacity());
        }
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn duplicate_capture_is_a_noop_anywhere_in_history() {
        let mut store = HistoryStore::new(10);
        for s in ["a", "b", "c"] {
            store.insert_if_absent(text(s));
        }
        let before = store.snapshot();
        assert_eq!(store.insert_if_absent(text("a")), InsertOutcome::Duplicate);
        let after = store.snapshot();
        assert_eq!(texts(&store), ["c", "b", "a"]);
        assert_eq!(before.version(), after.version());
    }

    #[test]
    fn hello_twice_keeps_single_entry_at_head() {
        let mut store = HistoryStore::default();
        store.insert_if_absent(text("hello"));
        store.insert_if_absent(text("hello"));
        assert_eq!(texts(&store), ["hello"]);
    }

    #[test]
    fn same_bytes_different_type_are_distinct() {
        let mut store = HistoryStore::default();
        store.insert_if_absent(text("png"));
        let outcome = store.insert_if_absent(ClipboardItem::new_image(b"png".to_vec()));
        assert!(outcome.is_inserted());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn promote_moves_item_to_head() {
        let mut store = HistoryStore::new(3);
        for s in ["A", "B", "C"] {
            store.insert_if_absent(text(s));
        }
        assert_eq!(texts(&store), ["C", "B", "A"]);
        let promoted = store.promote(2).expect("valid index");
        assert_eq!(promoted.as_text(), Some("A"));
        assert_eq!(texts(&store), ["A", "C", "B"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn promote_preserves_relative_order_of_others() {
        let mut store = HistoryStore::new(10);
        for s in ["1", "2", "3", "4", "5", "6"] {
            store.insert_if_absent(text(s));
        }
        store.promote(3).expect("valid index");
        assert_eq!(texts(&store), ["3", "6", "5", "4", "2", "1"]);
        store.promote(0).expect("head promote");
        assert_eq!(texts(&store), ["3", "6", "5", "4", "2", "1"]);
    }

    #[test]
    fn promote_out_of_range_leaves_state_untouched() {
        let mut store = HistoryStore::new(3);
        store.insert_if_absent(text("only"));
        let version = store.version();
        match store.promote(1) {
            Err(EngineError::IndexOutOfRange { index, len }) => assert_eq!((index, len), (1, 1)),
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(store.version(), version);
        assert_eq!(texts(&store), ["only"]);
    }

    #[test]
    fn remove_and_clear() {
        let mut store = HistoryStore::new(4);
        for s in ["a", "b", "c"] {
            store.insert_if_absent(text(s));
        }
        let removed = store.remove(1).expect("valid index");
        assert_eq!(removed.as_text(), Some("b"));
        assert_eq!(texts(&store), ["c", "a"]);
        assert!(store.remove(5).is_err());
        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut store = HistoryStore::new(0);
        store.insert_if_absent(text("x"));
        store.insert_if_absent(text("y"));
        assert_eq!(texts(&store), ["y"]);
    }

    #[test]
    fn snapshot_is_detached_from_live_history() {
        let mut store = HistoryStore::new(3);
        store.insert_if_absent(text("a"));
        let snapshot = store.snapshot();
        store.insert_if_absent(text("b"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.version() + 1, store.version());
        assert_eq!(snapshot.views()[0].preview, "a");
    }
}
