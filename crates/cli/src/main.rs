//! livetrack CLI — inspect live editor tracking from the command line.
//!
//! Commands:
//! - `detect` — Check whether a location would activate live editor mode
//! - `track`  — Run a message catalog through the tracker and dump the store
//! - `load`   — Fetch the live editor script with retries
//! - `config` — Show the effective configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "livetrack",
    about = "livetrack — live editor translation tracking",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a page location activates live editor mode
    Detect {
        /// Full page URL, including its query string
        #[arg(short, long)]
        url: String,

        /// The page is embedded in another frame
        #[arg(short, long)]
        embedded: bool,

        /// Skip detection and force live mode
        #[arg(short, long)]
        force: bool,

        /// Override the marker query parameter
        #[arg(short, long)]
        param: Option<String>,
    },

    /// Track a message catalog and print the resulting store (never fetches the editor script)
    Track {
        /// JSON file with the (possibly nested) message catalog
        #[arg(short, long)]
        messages: PathBuf,

        /// Locale recorded with every entry
        #[arg(short, long, default_value = "en")]
        locale: String,

        /// Message ids to render through the tracker (repeatable)
        #[arg(long = "format", value_name = "ID")]
        format: Vec<String>,

        /// Override the eviction threshold
        #[arg(long)]
        max_size: Option<usize>,

        /// Print the full store as JSON instead of the preview table
        #[arg(long)]
        json: bool,
    },

    /// Load the live editor script
    Load {
        /// Override the number of attempts
        #[arg(short, long)]
        attempts: Option<u32>,

        /// Override the delay between attempts, in milliseconds
        #[arg(short, long)]
        delay_ms: Option<u64>,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Detect {
            url,
            embedded,
            force,
            param,
        } => commands::detect::run(&url, embedded, force, param)?,
        Commands::Track {
            messages,
            locale,
            format,
            max_size,
            json,
        } => commands::track::run(&messages, &locale, &format, max_size, json)?,
        Commands::Load { attempts, delay_ms } => commands::load::run(attempts, delay_ms).await?,
        Commands::Config => commands::config_cmd::run()?,
    }

    Ok(())
}
