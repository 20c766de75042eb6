//! The host slot, the one place every tracking call finds the shared store.

use crate::debug::DebugDump;
use crate::store::TrackingStore;
use livetrack_core::clock::{Clock, SystemClock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::info;

static GLOBAL: OnceLock<HostSlot> = OnceLock::new();

/// Holds the lazily created store and the debug flag.
///
/// Without host facilities the slot stays empty and every operation through
/// it is a silent no-op.
pub struct HostSlot {
    available: bool,
    store: Mutex<Option<TrackingStore>>,
    debug: Arc<AtomicBool>,
    clock: Arc<dyn Clock>,
}

impl HostSlot {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            available: true,
            store: Mutex::new(None),
            debug: Arc::new(AtomicBool::new(false)),
            clock,
        }
    }

    /// A slot for a context without host facilities.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// The process-wide slot shared by every activation.
    pub fn global() -> &'static HostSlot {
        GLOBAL.get_or_init(HostSlot::new)
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Create the store if it does not exist yet and return it.
    pub fn initialize(&self) -> Option<TrackingStore> {
        if !self.available {
            return None;
        }
        let mut slot = self.lock();
        let store = slot.get_or_insert_with(|| {
            TrackingStore::with_debug_flag(self.clock.clone(), self.debug.clone())
        });
        Some(store.clone())
    }

    /// The store, if it has been initialized.
    pub fn store(&self) -> Option<TrackingStore> {
        self.lock().as_ref().cloned()
    }

    /// Drop the store. The next `initialize` starts from empty.
    pub fn reset(&self) {
        self.lock().take();
    }

    /// Turn per-track logging on or off for the slot's store.
    pub fn set_debug(&self, debug: bool) {
        self.debug.store(debug, Ordering::Relaxed);
    }

    pub fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Track through the slot; a no-op before initialization.
    pub fn track(&self, value: &str, id: &str, language: Option<&str>) {
        if let Some(store) = self.store() {
            store.track(value, id, language);
        }
    }

    /// Evict through the slot; returns 0 before initialization.
    pub fn evict(&self, max_size: usize) -> usize {
        self.store().map_or(0, |store| store.evict(max_size))
    }

    pub fn debug_dump(&self) -> Option<DebugDump> {
        let Some(store) = self.store() else {
            info!("Memory map not initialized");
            return None;
        };
        Some(store.debug_dump())
    }

    fn lock(&self) -> MutexGuard<'_, Option<TrackingStore>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for HostSlot {
    fn default() -> Self {
        Self::new()
    }
}
