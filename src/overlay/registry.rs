//! Overlay registry
//!
//! Maps each key to the overlay currently displayed for it. Owned by the
//! lifecycle controller and only ever touched from the UI execution context.

use hashbrown::HashMap;

use super::types::{OverlayEntry, OverlayKey, OverlayKind};

/// At most one live entry per key
#[derive(Debug, Default)]
pub struct OverlayRegistry {
    entries: HashMap<OverlayKey, OverlayEntry>,
}

impl OverlayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Returns the previous entry so the caller can
    /// detach its element.
    pub fn put(&mut self, entry: OverlayEntry) -> Option<OverlayEntry> {
        self.entries.insert(entry.key.clone(), entry)
    }

    pub fn get(&self, key: &OverlayKey) -> Option<&OverlayEntry> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &OverlayKey) -> Option<OverlayEntry> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &OverlayKey) -> bool {
        self.entries.contains_key(key)
    }

    /// All entries. Call again to restart the iteration.
    pub fn all(&self) -> impl Iterator<Item = &OverlayEntry> + '_ {
        self.entries.values()
    }

    /// Entries of one kind
    pub fn of_kind(&self, kind: OverlayKind) -> impl Iterator<Item = &OverlayEntry> + '_ {
        self.all().filter(move |e| e.kind() == kind)
    }

    /// Keys of all entries, sorted for deterministic processing order
    pub fn keys(&self) -> Vec<OverlayKey> {
        let mut keys: Vec<_> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
