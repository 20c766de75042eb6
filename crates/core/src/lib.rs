//! # livetrack core
//!
//! Domain types, traits, and error definitions shared by every livetrack
//! crate: the host environment seam and live editor detection, message
//! flattening, and the clock used to timestamp tracking events.
//!
//! The tracking store lives in `livetrack-store`, the script loader in
//! `livetrack-loader`; both depend inward on this crate.

pub mod clock;
pub mod error;
pub mod host;
pub mod messages;

// Re-export key types at crate root for ergonomics
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, LoadError, Result};
pub use host::{DEFAULT_LIVE_EDITOR_PARAM, HostEnvironment, StaticHost, detect_live_editor_mode};
pub use messages::{Messages, flatten_messages, flatten_value};
