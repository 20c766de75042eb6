//! Error types for the livetrack domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! None of these are fatal: every failure path folds into "tracking or
//! loading disabled" at the component boundary.

use thiserror::Error;

/// The top-level error type for all livetrack operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Host errors ---
    #[error("Host environment unavailable")]
    EnvironmentUnavailable,

    #[error("Access denied while probing host: {0}")]
    AccessDenied(String),

    // --- Loader errors ---
    #[error("Resource load error: {0}")]
    ResourceLoad(#[from] LoadError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single attempt to inject the live editor script.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("Request failed: {0}")]
    Network(String),

    #[error("Unexpected response status {status_code} from {url}")]
    Status { status_code: u16, url: String },

    #[error("Script host unavailable: {0}")]
    Unavailable(String),
}
