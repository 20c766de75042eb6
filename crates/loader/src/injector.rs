//! Script injection: how one load attempt reaches the remote editor script.

use async_trait::async_trait;
use livetrack_core::error::LoadError;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::debug;

/// Injects the live editor script into the host, and takes it out again.
///
/// Implementations: HTTP fetch (production), test doubles.
#[async_trait]
pub trait ScriptInjector: Send + Sync {
    /// The injector name (e.g., "http").
    fn name(&self) -> &str;

    /// Attempt to load the script at `url`. One call is one attempt.
    async fn inject(&self, url: &str) -> Result<(), LoadError>;

    /// Remove whatever a failed attempt left behind.
    async fn remove(&self, url: &str);
}

/// Fetches the script over HTTP and keeps its source for the host to evaluate.
pub struct HttpScriptInjector {
    client: reqwest::Client,
    script: RwLock<Option<String>>,
}

impl HttpScriptInjector {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            script: RwLock::new(None),
        }
    }

    /// Source of the loaded script, once an attempt has succeeded.
    pub fn script(&self) -> Option<String> {
        self.script
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for HttpScriptInjector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScriptInjector for HttpScriptInjector {
    fn name(&self) -> &str {
        "http"
    }

    async fn inject(&self, url: &str) -> Result<(), LoadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                status_code: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?;
        debug!(url = %url, bytes = body.len(), "Fetched live editor script");

        *self.script.write().unwrap_or_else(PoisonError::into_inner) = Some(body);
        Ok(())
    }

    async fn remove(&self, _url: &str) {
        self.script
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_loaded_initially() {
        let injector = HttpScriptInjector::new();
        assert_eq!(injector.name(), "http");
        assert!(injector.script().is_none());
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let injector = HttpScriptInjector::new();
        let result = injector.inject("http://127.0.0.1:9/live-editor.js").await;
        assert!(matches!(result, Err(LoadError::Network(_))));
        injector.remove("http://127.0.0.1:9/live-editor.js").await;
        assert!(injector.script().is_none());
    }
}
