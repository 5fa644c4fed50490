//! CLI commands implementation.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::load_settings;
use crate::extract;
use crate::scrapers::{create_fetcher, duty_url};
use crate::server;

#[derive(Parser)]
#[command(name = "nobetci")]
#[command(about = "On-duty pharmacy (nöbetçi eczane) lookup for Turkish districts")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, global = true, env = "NOBETCI_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to bind (host:port), overrides the configured value
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Scrape one district and print the records as JSON
    Fetch {
        /// City slug as used by the listing site
        city: String,
        /// District slug
        district: String,
        /// Print compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.server.bind.clone());
            server::serve(settings, &bind).await
        }
        Commands::Fetch {
            city,
            district,
            compact,
        } => cmd_fetch(&settings, &city, &district, compact).await,
    }
}

/// One-shot scrape to stdout.
async fn cmd_fetch(
    settings: &crate::config::Settings,
    city: &str,
    district: &str,
    compact: bool,
) -> anyhow::Result<()> {
    let fetcher = create_fetcher(settings)?;
    let url = duty_url(&settings.scrape.url_template, city, district)?;

    let html = fetcher.fetch(&url).await?;
    let extraction = extract::duty_pharmacies(&html, Some(&url));
    if extraction.skipped_rows > 0 {
        tracing::warn!("{} malformed rows skipped", extraction.skipped_rows);
    }

    let output = if compact {
        serde_json::to_string(&extraction.pharmacies)?
    } else {
        serde_json::to_string_pretty(&extraction.pharmacies)?
    };
    println!("{}", output);

    Ok(())
}
