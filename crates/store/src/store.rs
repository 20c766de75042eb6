//! The tracking store: rendered value → identifiers, bounded by explicit eviction.

use crate::debug::DebugDump;
use crate::entry::TrackingEntry;
use indexmap::IndexMap;
use livetrack_core::clock::{Clock, SystemClock};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Shared handle to the value → entry index.
///
/// Cloning is cheap; all clones see the same entries. Iteration order is the
/// order in which values were first tracked. The store never bounds itself:
/// callers cap it with [`TrackingStore::evict`].
#[derive(Clone)]
pub struct TrackingStore {
    entries: Arc<RwLock<IndexMap<String, TrackingEntry>>>,
    clock: Arc<dyn Clock>,
    debug: Arc<AtomicBool>,
}

impl TrackingStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_debug_flag(clock, Arc::new(AtomicBool::new(false)))
    }

    /// A store whose debug logging follows a flag owned elsewhere.
    pub(crate) fn with_debug_flag(clock: Arc<dyn Clock>, debug: Arc<AtomicBool>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(IndexMap::new())),
            clock,
            debug,
        }
    }

    /// Log every tracked value when set.
    pub fn set_debug(&self, debug: bool) {
        self.debug.store(debug, Ordering::Relaxed);
    }

    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Record that `id` rendered to `value`.
    ///
    /// Adds `id` to the value's identifier set and refreshes its language and
    /// timestamp, or creates the entry.
    pub fn track(&self, value: &str, id: &str, language: Option<&str>) {
        let now = self.clock.now();
        let mut entries = self.write();
        match entries.get_mut(value) {
            Some(entry) => entry.touch(id, language, now),
            None => {
                entries.insert(value.to_string(), TrackingEntry::new(id, language, now));
            }
        }
        drop(entries);
        if self.is_debug() {
            debug!(value = %value, key = %id, language = ?language, "Tracked translation");
        }
    }

    /// Drop the least recently tracked entries until at most `max_size` remain.
    ///
    /// Ties on timestamp keep store order: the value tracked first goes first.
    /// Returns the number of entries removed.
    pub fn evict(&self, max_size: usize) -> usize {
        let mut entries = self.write();
        if entries.len() <= max_size {
            return 0;
        }
        let to_remove = entries.len() - max_size;

        let mut by_age: Vec<(&String, _)> = entries
            .iter()
            .map(|(value, entry)| (value, entry.metadata.tracked_at))
            .collect();
        by_age.sort_by_key(|&(_, tracked_at)| tracked_at);

        let doomed: HashSet<String> = by_age
            .into_iter()
            .take(to_remove)
            .map(|(value, _)| value.clone())
            .collect();
        entries.retain(|value, _| !doomed.contains(value));

        debug!(removed = to_remove, remaining = entries.len(), "Evicted tracking entries");
        to_remove
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn get(&self, value: &str) -> Option<TrackingEntry> {
        self.read().get(value).cloned()
    }

    /// Identifiers that rendered to `value`, in the order they were first seen.
    pub fn ids_for(&self, value: &str) -> Vec<String> {
        self.read()
            .get(value)
            .map(|entry| entry.ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Values currently held, in store order.
    pub fn values(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// Read-only summary of the first entries.
    pub fn debug_dump(&self) -> DebugDump {
        DebugDump::from_entries(&self.read())
    }

    /// Export the whole map as `{ value: entry }` for the editing script.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(&*self.read())
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, TrackingEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<String, TrackingEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TrackingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TrackingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingStore")
            .field("entries", &self.len())
            .finish()
    }
}
