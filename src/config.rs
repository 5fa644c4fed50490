//! Configuration management.
//!
//! Settings come from an optional TOML file (`nobetci.toml` by default,
//! overridable with `--config` or the `NOBETCI_CONFIG` environment
//! variable). Every field has a working default so the binary runs with
//! no configuration at all.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::scrapers::BrowserEngineConfig;

/// Default listing URL template. `{city}` and `{district}` are
/// substituted verbatim.
pub const DEFAULT_URL_TEMPLATE: &str = "https://www.eczaneler.gen.tr/nobetci-{city}-{district}";

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub scrape: ScrapeConfig,
    pub browser: BrowserEngineConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind (host:port).
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

/// Which fetch mechanism retrieves the listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchBackend {
    /// Direct HTTP GET with a spoofed user agent.
    #[default]
    Http,
    /// Headless browser session (requires the `browser` feature and a
    /// local Chrome install).
    Browser,
}

/// Scrape settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Listing URL template with `{city}`/`{district}` placeholders.
    pub url_template: String,
    /// City used by the default route.
    pub default_city: String,
    /// District used by the default route.
    pub default_district: String,
    /// Network timeout in seconds for one page fetch.
    pub timeout_secs: u64,
    /// Custom user agent; unset means browser impersonation.
    pub user_agent: Option<String>,
    /// Fetch mechanism.
    pub backend: FetchBackend,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            default_city: "istanbul".to_string(),
            default_district: "kadikoy".to_string(),
            timeout_secs: 30,
            user_agent: None,
            backend: FetchBackend::default(),
        }
    }
}

/// Load settings from an explicit path, `NOBETCI_CONFIG`, or
/// `nobetci.toml` in the working directory.
///
/// An explicitly requested file must exist; the implicit default path is
/// allowed to be absent.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let explicit = path
        .map(PathBuf::from)
        .or_else(|| env::var("NOBETCI_CONFIG").ok().map(PathBuf::from));

    let (config_path, required) = match explicit {
        Some(p) => (p, true),
        None => (PathBuf::from("nobetci.toml"), false),
    };

    if !config_path.exists() {
        if required {
            anyhow::bail!("config file not found: {}", config_path.display());
        }
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(&config_path)?;
    let settings: Settings = toml::from_str(&raw)?;
    tracing::debug!("Loaded settings from {}", config_path.display());
    Ok(settings)
}
