//! Live editor script loading for livetrack.
//!
//! One attempt sequence per loader, retried with a fixed delay, shared by
//! every caller. Injection and waiting sit behind traits so the retry logic
//! runs without network or real time in tests.

pub mod injector;
pub mod loader;
pub mod scheduler;

pub use injector::{HttpScriptInjector, ScriptInjector};
pub use loader::{LIVE_EDITOR_SCRIPT_URL, LoadOptions, LoadOutcome, LoadState, ResourceLoader};
pub use scheduler::{Scheduler, TokioScheduler};
