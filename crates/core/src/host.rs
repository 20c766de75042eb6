//! Host environment probing and live editor detection.
//!
//! The host is whatever embeds the formatting library: a webview, a browser
//! frame, a test harness. Detection is fail-closed: any error while probing
//! the host counts as "not in live editor mode".

use crate::error::{Error, Result};
use tracing::debug;

/// Query parameter the live editor appends to the embedded page's URL.
pub const DEFAULT_LIVE_EDITOR_PARAM: &str = "contentstorage_live_editor";

/// Read-only view of the execution context the tracker runs in.
pub trait HostEnvironment: Send + Sync {
    /// Whether host facilities exist at all (a window, a document, ...).
    fn is_available(&self) -> bool;

    /// Whether the current context is nested inside a different top-level
    /// context. Probing the parent may be refused by the host.
    fn is_embedded(&self) -> Result<bool>;

    /// The current location's query string, with or without the leading `?`.
    fn location_search(&self) -> Result<String>;
}

/// Decide whether live editor tracking should activate.
///
/// `force` short-circuits every check. Otherwise the host must be available,
/// embedded in another context, and carry `param_name` as a query key.
pub fn detect_live_editor_mode(host: &dyn HostEnvironment, param_name: &str, force: bool) -> bool {
    if force {
        return true;
    }
    if !host.is_available() {
        return false;
    }

    match probe(host, param_name) {
        Ok(active) => active,
        Err(e) => {
            debug!(error = %e, "Live editor probe failed, staying in normal mode");
            false
        }
    }
}

fn probe(host: &dyn HostEnvironment, param_name: &str) -> Result<bool> {
    let embedded = host.is_embedded()?;
    let search = host.location_search()?;
    Ok(embedded && has_query_key(&search, param_name))
}

/// Whether `search` contains `key` as a parameter name, regardless of value.
pub fn has_query_key(search: &str, key: &str) -> bool {
    let query = search.strip_prefix('?').unwrap_or(search);
    url::form_urlencoded::parse(query.as_bytes()).any(|(k, _)| k == key)
}

/// A host described by plain data. Used by the CLI and in tests.
#[derive(Debug, Clone)]
pub struct StaticHost {
    available: bool,
    embedded: std::result::Result<bool, String>,
    search: String,
}

impl StaticHost {
    /// An available, top-level host with the given query string.
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            available: true,
            embedded: Ok(false),
            search: search.into(),
        }
    }

    /// Build a host from a full location URL.
    pub fn from_url(location: &str) -> Result<Self> {
        let parsed = url::Url::parse(location)
            .map_err(|e| Error::Internal(format!("invalid location '{location}': {e}")))?;
        let search = parsed.query().map(|q| format!("?{q}")).unwrap_or_default();
        Ok(Self::new(search))
    }

    /// A context without any host facilities.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            embedded: Ok(false),
            search: String::new(),
        }
    }

    pub fn embedded(mut self, embedded: bool) -> Self {
        self.embedded = Ok(embedded);
        self
    }

    /// Make probing the enclosing context fail, like a cross-origin parent.
    pub fn deny_parent_access(mut self, reason: impl Into<String>) -> Self {
        self.embedded = Err(reason.into());
        self
    }
}

impl HostEnvironment for StaticHost {
    fn is_available(&self) -> bool {
        self.available
    }

    fn is_embedded(&self) -> Result<bool> {
        if !self.available {
            return Err(Error::EnvironmentUnavailable);
        }
        self.embedded.clone().map_err(Error::AccessDenied)
    }

    fn location_search(&self) -> Result<String> {
        if !self.available {
            return Err(Error::EnvironmentUnavailable);
        }
        Ok(self.search.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAM: &str = DEFAULT_LIVE_EDITOR_PARAM;

    #[test]
    fn forced_mode_always_detects() {
        assert!(detect_live_editor_mode(&StaticHost::unavailable(), PARAM, true));
        assert!(detect_live_editor_mode(&StaticHost::new(""), PARAM, true));
    }

    #[test]
    fn unavailable_host_is_not_live() {
        assert!(!detect_live_editor_mode(&StaticHost::unavailable(), PARAM, false));
    }

    #[test]
    fn embedded_with_marker_is_live() {
        let host = StaticHost::new("?contentstorage_live_editor=true").embedded(true);
        assert!(detect_live_editor_mode(&host, PARAM, false));
    }

    #[test]
    fn marker_without_embedding_is_not_live() {
        let host = StaticHost::new("?contentstorage_live_editor=true");
        assert!(!detect_live_editor_mode(&host, PARAM, false));
    }

    #[test]
    fn embedding_without_marker_is_not_live() {
        let host = StaticHost::new("?page=2").embedded(true);
        assert!(!detect_live_editor_mode(&host, PARAM, false));
    }

    #[test]
    fn access_denied_fails_closed() {
        let host = StaticHost::new("?contentstorage_live_editor")
            .deny_parent_access("blocked a frame with origin");
        assert!(!detect_live_editor_mode(&host, PARAM, false));
    }

    #[test]
    fn marker_value_is_irrelevant() {
        assert!(has_query_key("?contentstorage_live_editor", PARAM));
        assert!(has_query_key("?contentstorage_live_editor=", PARAM));
        assert!(has_query_key("a=1&contentstorage_live_editor=0", PARAM));
        assert!(!has_query_key("?contentstorage_live_editor_x=1", PARAM));
        assert!(!has_query_key("", PARAM));
    }

    #[test]
    fn query_keys_are_decoded() {
        assert!(has_query_key("?my%20param=1", "my param"));
        assert!(has_query_key("?my+param", "my param"));
    }

    #[test]
    fn custom_param_name() {
        let host = StaticHost::new("?edit_mode=1").embedded(true);
        assert!(detect_live_editor_mode(&host, "edit_mode", false));
        assert!(!detect_live_editor_mode(&host, PARAM, false));
    }

    #[test]
    fn host_from_url_keeps_query() {
        let host = StaticHost::from_url("https://app.example/page?contentstorage_live_editor=1#top")
            .unwrap()
            .embedded(true);
        assert_eq!(host.location_search().unwrap(), "?contentstorage_live_editor=1");
        assert!(detect_live_editor_mode(&host, PARAM, false));
    }

    #[test]
    fn host_from_invalid_url_is_error() {
        assert!(StaticHost::from_url("not a url").is_err());
    }
}
