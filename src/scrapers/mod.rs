//! Page fetchers for the duty listing site.

pub mod browser;
pub mod http_client;

#[cfg(feature = "browser")]
pub use browser::BrowserFetcher;
pub use browser::BrowserEngineConfig;
pub use http_client::HttpFetcher;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::config::{FetchBackend, Settings};

/// Error surfaced by a page fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("server returned HTTP {0}")]
    Status(u16),

    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("browser fetch failed: {0}")]
    Browser(String),

    #[error("invalid target URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Map a reqwest error, keeping timeouts distinct from other
    /// transport failures.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err)
        }
    }
}

/// Retrieves the raw HTML for one listing URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Build the listing URL for a city/district pair.
///
/// Substitutes trimmed values into the configured template and validates
/// the result.
pub fn duty_url(template: &str, city: &str, district: &str) -> Result<String, FetchError> {
    let city = city.trim();
    let district = district.trim();
    if city.is_empty() || district.is_empty() {
        return Err(FetchError::InvalidUrl(
            "city and district must be non-empty".to_string(),
        ));
    }

    let url = template
        .replace("{city}", city)
        .replace("{district}", district);
    Url::parse(&url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;
    Ok(url)
}

/// Build the fetcher selected by configuration.
pub fn create_fetcher(settings: &Settings) -> anyhow::Result<Arc<dyn PageFetcher>> {
    let timeout = Duration::from_secs(settings.scrape.timeout_secs);
    match settings.scrape.backend {
        FetchBackend::Http => Ok(Arc::new(HttpFetcher::new(
            timeout,
            settings.scrape.user_agent.as_deref(),
        )?)),
        #[cfg(feature = "browser")]
        FetchBackend::Browser => Ok(Arc::new(BrowserFetcher::new(settings.browser.clone()))),
        #[cfg(not(feature = "browser"))]
        FetchBackend::Browser => anyhow::bail!(
            "browser backend requested but this build has the `browser` feature disabled"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "https://www.eczaneler.gen.tr/nobetci-{city}-{district}";

    #[test]
    fn test_duty_url_substitution() {
        let url = duty_url(TEMPLATE, "istanbul", "kadikoy").unwrap();
        assert_eq!(url, "https://www.eczaneler.gen.tr/nobetci-istanbul-kadikoy");
    }

    #[test]
    fn test_duty_url_trims_parameters() {
        let url = duty_url(TEMPLATE, " ankara ", "\tcankaya\n").unwrap();
        assert_eq!(url, "https://www.eczaneler.gen.tr/nobetci-ankara-cankaya");
    }

    #[test]
    fn test_duty_url_rejects_empty() {
        assert!(matches!(
            duty_url(TEMPLATE, "", "kadikoy"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(
            duty_url(TEMPLATE, "istanbul", "  "),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_duty_url_rejects_unparseable_template() {
        assert!(matches!(
            duty_url("not a url {city}-{district}", "istanbul", "kadikoy"),
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
