//! `livetrack config` — Show the effective configuration.

use livetrack_config::LiveConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = LiveConfig::config_dir().join("config.toml");

    match LiveConfig::load() {
        Ok(config) => {
            if config_path.exists() {
                println!("# {}", config_path.display());
            } else {
                println!("# no config file at {}, showing defaults", config_path.display());
            }
            print!("{}", config.to_toml());
        }
        Err(e) => {
            println!("❌ Config error: {e}");
        }
    }

    Ok(())
}
