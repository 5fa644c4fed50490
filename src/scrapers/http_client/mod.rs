//! Plain HTTP fetcher with a spoofed user agent.

mod user_agent;

#[allow(unused_imports)]
pub use user_agent::{resolve_user_agent, IMPERSONATE_USER_AGENTS};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{FetchError, PageFetcher};

/// Fetcher backed by a direct HTTP GET.
///
/// The listing site serves the duty table to plain requests as long as
/// the user agent looks like a real browser.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher with a bounded request timeout.
    ///
    /// `user_agent_config`:
    /// - None: random real browser user agent
    /// - Some(custom): custom user agent string
    pub fn new(timeout: Duration, user_agent_config: Option<&str>) -> Result<Self, FetchError> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(FetchError::from_reqwest)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(FetchError::from_reqwest)
    }
}
