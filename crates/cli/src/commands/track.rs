//! `livetrack track` — Run a catalog through the tracker and show the store.

use async_trait::async_trait;
use livetrack_config::LiveConfig;
use livetrack_core::error::LoadError;
use livetrack_core::host::StaticHost;
use livetrack_core::messages::Messages;
use livetrack_intl::{CatalogFormatter, MessageDescriptor, MessageFormatter, TrackedFormatter};
use livetrack_loader::{ResourceLoader, ScriptInjector, TokioScheduler};
use livetrack_store::HostSlot;
use std::path::Path;
use std::sync::Arc;

/// There is no editor page to load into from the command line.
struct NoEditor;

#[async_trait]
impl ScriptInjector for NoEditor {
    fn name(&self) -> &str {
        "none"
    }

    async fn inject(&self, _url: &str) -> Result<(), LoadError> {
        Ok(())
    }

    async fn remove(&self, _url: &str) {}
}

pub fn run(
    messages_path: &Path,
    locale: &str,
    format_ids: &[String],
    max_size: Option<usize>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = LiveConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    config.force_live_mode = true;
    if let Some(max_size) = max_size {
        config.max_memory_map_size = max_size;
    }

    let content = std::fs::read_to_string(messages_path)
        .map_err(|e| format!("Failed to read {}: {e}", messages_path.display()))?;
    let messages: Messages = serde_json::from_str(&content)
        .map_err(|e| format!("{} is not a JSON object: {e}", messages_path.display()))?;

    let slot = HostSlot::new();
    let loader = ResourceLoader::new(Arc::new(NoEditor), Arc::new(TokioScheduler));
    let formatter = CatalogFormatter::new(locale, &messages);
    let tracked = TrackedFormatter::activate(
        &config,
        &StaticHost::new(""),
        &slot,
        &loader,
        formatter,
        &messages,
    );
    let store = tracked.store().ok_or("Tracking did not activate")?.clone();

    for id in format_ids {
        let rendered = tracked.format_message(&MessageDescriptor::id(id.as_str()), None);
        tracing::debug!(id = %id, rendered = ?rendered, "Formatted message");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&store.to_json()?)?);
    } else {
        print!("{}", store.debug_dump());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use livetrack_loader::LoadOptions;

    #[tokio::test]
    async fn local_loader_never_leaves_the_process() {
        let loader = ResourceLoader::new(Arc::new(NoEditor), Arc::new(TokioScheduler));
        assert_eq!(loader.injector_name(), "none");
        assert!(loader.load(LoadOptions::default()).await);
    }
}
