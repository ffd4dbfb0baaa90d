//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Base delay between requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// Crawl stops once this many distinct ISBNs have been collected
    #[serde(default = "default_target_count")]
    pub target_count: usize,

    /// Maximum number of search pages ever fetched
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Results per search page (item-offset step in search URLs)
    #[serde(default = "default_page_step")]
    pub page_step: u32,

    /// CSV artifact the crawl writes and the analyses read
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Provider the analyses compare against the rest of the market
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Home country for the foreign-offers analysis
    #[serde(default = "default_home_country")]
    pub home_country: String,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_delay_jitter_ms() -> u64 {
    3000
}

fn default_target_count() -> usize {
    1000
}

fn default_max_pages() -> u32 {
    30
}

fn default_page_step() -> u32 {
    50
}

fn default_output() -> PathBuf {
    PathBuf::from("1000_all_providers_with_limit.csv")
}

fn default_provider() -> String {
    "Bookbot".to_string()
}

fn default_home_country() -> String {
    "Tschechien".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            target_count: default_target_count(),
            max_pages: default_max_pages(),
            page_step: default_page_step(),
            output: default_output(),
            provider: default_provider(),
            home_country: default_home_country(),
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("bookbot-crawler").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(proxy) = std::env::var("BOOKBOT_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("BOOKBOT_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(target) = std::env::var("BOOKBOT_TARGET") {
            if let Ok(t) = target.parse() {
                self.target_count = t;
            }
        }

        self
    }
}

/// Output format for analysis results and data samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use: table, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
