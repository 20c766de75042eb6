//! `livetrack load` — Fetch the live editor script, retrying like the tracker does.

use livetrack_config::LiveConfig;
use livetrack_loader::{HttpScriptInjector, LoadOptions, ResourceLoader, TokioScheduler};
use std::sync::Arc;
use std::time::Duration;

pub async fn run(
    attempts: Option<u32>,
    delay_ms: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = LiveConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let options = LoadOptions {
        max_attempts: attempts.unwrap_or(config.loader.max_attempts),
        retry_delay: delay_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.loader.retry_delay()),
        debug: true,
    };

    let injector = Arc::new(HttpScriptInjector::new());
    let loader = ResourceLoader::new(injector.clone(), Arc::new(TokioScheduler));

    println!("Loading {}", loader.url());
    println!(
        "  {} attempt(s), {}ms apart",
        options.max_attempts.max(1),
        options.retry_delay.as_millis()
    );

    if loader.load(options).await {
        let size = injector.script().map(|s| s.len()).unwrap_or(0);
        println!("  ✅ Live editor script loaded ({size} bytes)");
    } else {
        println!("  ❌ Live editor script could not be loaded");
    }

    Ok(())
}
