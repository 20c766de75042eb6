//! `livetrack detect` — Would this location activate live editor mode?

use livetrack_config::LiveConfig;
use livetrack_core::host::{HostEnvironment, StaticHost, detect_live_editor_mode};

pub fn run(
    url: &str,
    embedded: bool,
    force: bool,
    param: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = LiveConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let param = param.unwrap_or(config.live_editor_param);
    let force = force || config.force_live_mode;

    let host = StaticHost::from_url(url)?.embedded(embedded);
    let search = host.location_search()?;
    let live = detect_live_editor_mode(&host, &param, force);

    println!("Live editor detection");
    println!("=====================");
    println!("  Location:   {url}");
    println!("  Query:      {}", if search.is_empty() { "(none)" } else { search.as_str() });
    println!("  Marker:     {param}");
    println!("  Embedded:   {}", if embedded { "yes" } else { "no" });
    println!("  Forced:     {}", if force { "yes" } else { "no" });
    println!();
    if live {
        println!("  ✅ Live editor mode would activate");
    } else {
        println!("  ⏸️  Normal mode (tracking stays off)");
    }

    Ok(())
}
