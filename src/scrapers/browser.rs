//! Browser-based fetcher for bot-protected page loads.
//!
//! Uses chromiumoxide (CDP) to render the listing page in headless
//! Chrome before extraction. Each fetch runs in its own browser session:
//! the browser is launched for the request and closed on every exit
//! path, so no Chrome processes outlive a request.

#[cfg(feature = "browser")]
use std::path::PathBuf;
#[cfg(feature = "browser")]
use std::time::Duration;

use serde::{Deserialize, Serialize};
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

#[cfg(feature = "browser")]
use async_trait::async_trait;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig};
#[cfg(feature = "browser")]
use futures::StreamExt;

#[cfg(feature = "browser")]
use super::http_client::resolve_user_agent;
#[cfg(feature = "browser")]
use super::{FetchError, PageFetcher};

/// Browser engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    pub headless: bool,

    /// Page load timeout in seconds.
    pub timeout_secs: u64,

    /// CSS selector to wait for before taking the page content.
    pub wait_for_selector: String,

    /// Additional Chrome arguments.
    pub chrome_args: Vec<String>,
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: true,
            timeout_secs: 30,
            wait_for_selector: "table.table".to_string(),
            chrome_args: Vec::new(),
        }
    }
}

/// Fetcher that renders pages in a request-scoped headless Chrome.
#[cfg(feature = "browser")]
pub struct BrowserFetcher {
    config: BrowserEngineConfig,
}

#[cfg(feature = "browser")]
impl BrowserFetcher {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];

    /// Create a new browser fetcher.
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }

    /// Find a Chrome executable.
    fn find_chrome() -> Result<PathBuf, FetchError> {
        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                debug!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in &["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        debug!("Found Chrome in PATH: {}", path);
                        return Ok(PathBuf::from(path));
                    }
                }
            }
        }

        Err(FetchError::Browser(
            "Chrome/Chromium not found; install it or use the http backend".to_string(),
        ))
    }

    /// Launch a browser session for one request.
    async fn launch(&self) -> Result<(Browser, tokio::task::JoinHandle<()>), FetchError> {
        let chrome_path = Self::find_chrome()?;

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);
        if !self.config.headless {
            builder = builder.with_head();
        }
        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox")
            .arg("--disable-gpu");
        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder
            .build()
            .map_err(|e| FetchError::Browser(format!("browser config: {}", e)))?;

        info!("Launching browser (headless={})", self.config.headless);
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| FetchError::Browser(format!("launch failed: {}", e)))?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handle))
    }

    /// Navigate and capture the page HTML within the launched session.
    async fn fetch_page(&self, browser: &Browser, url: &str) -> Result<String, FetchError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Browser(format!("new page: {}", e)))?;

        // Set a realistic user agent before any navigation
        let user_agent = resolve_user_agent(None);
        page.execute(SetUserAgentOverrideParams::new(user_agent))
            .await
            .map_err(|e| FetchError::Browser(format!("user agent override: {}", e)))?;

        info!("Navigating to {}", url);
        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| FetchError::Browser(format!("invalid URL: {}", e)))?;

        let timeout = Duration::from_secs(self.config.timeout_secs);
        match tokio::time::timeout(timeout, page.execute(nav_params)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(FetchError::Browser(format!("navigation: {}", e))),
            Err(_) => return Err(FetchError::Timeout),
        }

        // The duty table is rendered after the page scripts run
        debug!("Waiting for selector: {}", self.config.wait_for_selector);
        match tokio::time::timeout(
            timeout,
            page.find_element(self.config.wait_for_selector.as_str()),
        )
        .await
        {
            Ok(Ok(_)) => debug!("Selector found"),
            Ok(Err(e)) => warn!("Selector not found: {}", e),
            Err(_) => return Err(FetchError::Timeout),
        }

        let content = page
            .content()
            .await
            .map_err(|e| FetchError::Browser(format!("page content: {}", e)))?;

        let _ = page.close().await;
        Ok(content)
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let (mut browser, handler) = self.launch().await?;

        // The session must be released on every exit path, so the fetch
        // result is held until the browser is closed and reaped.
        let result = self.fetch_page(&browser, url).await;

        if let Err(e) = browser.close().await {
            warn!("Failed to close browser cleanly: {}", e);
        }
        let _ = browser.wait().await;
        handler.abort();

        result
    }
}
