//! Translation tracking store for livetrack.
//!
//! Maps each rendered text value to the content identifiers that produced
//! it. The store is shared through a [`HostSlot`] and bounded only by
//! explicit calls to [`TrackingStore::evict`].

pub mod debug;
pub mod entry;
pub mod slot;
pub mod store;

pub use debug::{DebugDump, PreviewRow};
pub use entry::{EntryKind, EntryMetadata, TrackingEntry};
pub use slot::HostSlot;
pub use store::TrackingStore;
