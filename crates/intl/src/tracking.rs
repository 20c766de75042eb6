//! Tracked formatting: the live editor's view of every rendered message.
//!
//! Activation decides once whether tracking is on. When it is, the initial
//! catalog is recorded, the editor script starts loading in the background,
//! and every text result of `format_message` is recorded and the store
//! trimmed back to the configured size.

use crate::formatter::{FormatValues, Formatted, MessageDescriptor, MessageFormatter};
use livetrack_config::LiveConfig;
use livetrack_core::host::{HostEnvironment, detect_live_editor_mode};
use livetrack_core::messages::{Messages, flatten_messages};
use livetrack_loader::{LoadOptions, LoadOutcome, ResourceLoader};
use livetrack_store::{HostSlot, TrackingStore};
use tracing::{info, warn};

/// A formatter that may be recording its output for the live editor.
pub struct TrackedFormatter<F> {
    inner: F,
    session: Option<LiveSession>,
}

struct LiveSession {
    store: TrackingStore,
    locale: String,
    max_entries: usize,
    editor: LoadOutcome,
}

impl<F: MessageFormatter> TrackedFormatter<F> {
    /// Wrap `inner`, activating tracking if the host is the live editor.
    pub fn activate(
        config: &LiveConfig,
        host: &dyn HostEnvironment,
        slot: &HostSlot,
        loader: &ResourceLoader,
        inner: F,
        messages: &Messages,
    ) -> Self {
        let live = detect_live_editor_mode(host, &config.live_editor_param, config.force_live_mode);
        if !live {
            if config.debug {
                info!("Running in normal mode (not live editor)");
            }
            return Self::passthrough(inner);
        }

        if config.debug {
            info!("Live editor mode enabled");
        }

        let Some(store) = slot.initialize() else {
            warn!("Live editor mode requested but the host has no tracking slot");
            return Self::passthrough(inner);
        };
        slot.set_debug(config.debug);

        let editor = loader.start(LoadOptions {
            max_attempts: config.loader.max_attempts,
            retry_delay: config.loader.retry_delay(),
            debug: config.debug,
        });
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(report_editor_outcome(editor.clone(), config.debug));
        }

        let locale = inner.locale().to_string();
        let initial = flatten_messages(messages);
        for (id, value) in &initial {
            store.track(value, id, Some(&locale));
        }
        if config.debug {
            info!(count = initial.len(), locale = %locale, "Tracked static messages");
            info!("Live editor tracking initialized");
        }

        Self {
            inner,
            session: Some(LiveSession {
                store,
                locale,
                max_entries: config.max_memory_map_size,
                editor,
            }),
        }
    }

    /// Activate against the process-wide slot and loader.
    pub fn activate_global(
        config: &LiveConfig,
        host: &dyn HostEnvironment,
        inner: F,
        messages: &Messages,
    ) -> Self {
        Self::activate(
            config,
            host,
            HostSlot::global(),
            ResourceLoader::global(),
            inner,
            messages,
        )
    }

    /// Wrap `inner` without tracking anything.
    pub fn passthrough(inner: F) -> Self {
        Self {
            inner,
            session: None,
        }
    }

    pub fn is_live(&self) -> bool {
        self.session.is_some()
    }

    pub fn store(&self) -> Option<&TrackingStore> {
        self.session.as_ref().map(|s| &s.store)
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Whether the editor script has loaded; `None` while pending or when not live.
    pub fn editor_ready(&self) -> Option<bool> {
        self.session.as_ref().and_then(|s| s.editor.peek())
    }

    /// Wait for the editor script outcome. `None` when not live.
    pub async fn wait_editor_ready(&self) -> Option<bool> {
        let editor = self.session.as_ref()?.editor.clone();
        Some(editor.wait().await)
    }
}

async fn report_editor_outcome(editor: LoadOutcome, debug: bool) {
    if editor.wait().await {
        if debug {
            info!("Live editor ready");
        }
    } else {
        warn!("Failed to load live editor script");
    }
}

impl<F: MessageFormatter> MessageFormatter for TrackedFormatter<F> {
    fn locale(&self) -> &str {
        self.inner.locale()
    }

    fn format_message(
        &self,
        descriptor: &MessageDescriptor,
        values: Option<&FormatValues>,
    ) -> Formatted {
        let result = self.inner.format_message(descriptor, values);

        let id = descriptor.id.as_deref().filter(|id| !id.is_empty());
        if let (Some(session), Some(text), Some(id)) = (&self.session, result.as_text(), id) {
            session.store.track(text, id, Some(&session.locale));
            if session.max_entries > 0 {
                session.store.evict(session.max_entries);
            }
        }

        result
    }
}
