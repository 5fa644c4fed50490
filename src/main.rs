//! Nobetci - on-duty pharmacy lookup service.
//!
//! Fetches the public duty listing page for a Turkish city/district,
//! extracts the pharmacy records and serves them as JSON.

mod cli;
mod config;
mod extract;
mod models;
mod scrapers;
mod server;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "nobetci=info"
    } else {
        "nobetci=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
