//! Live editor tracking for formatted messages.
//!
//! [`TrackedFormatter`] wraps any [`MessageFormatter`]. Outside the live
//! editor it is a plain passthrough; inside, every rendered string is
//! traced back to the message id that produced it.

pub mod formatter;
pub mod tracking;

pub use formatter::{
    CatalogFormatter, FormatValues, Formatted, MessageDescriptor, MessageFormatter, interpolate,
};
pub use tracking::TrackedFormatter;
