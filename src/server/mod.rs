//! Web server exposing the duty pharmacy API.

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::scrapers::{self, PageFetcher};

/// Shared state for the web server.
///
/// Immutable after startup; requests share nothing else.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn PageFetcher>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let fetcher = scrapers::create_fetcher(&settings)?;
        Ok(Self {
            fetcher,
            settings: Arc::new(settings),
        })
    }
}

/// Start the web server.
pub async fn serve(settings: Settings, bind: &str) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state);

    let addr: SocketAddr = bind.parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
