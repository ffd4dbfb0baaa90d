//! HTTP client for AbeBooks requests using wreq for TLS fingerprint emulation.

use crate::config::Config;
use async_trait::async_trait;
use rand::RngExt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Maximum number of attempts for a single URL when rate limited.
pub const MAX_ATTEMPTS: u32 = 12;

/// Classified fetch failures. Everything here degrades to "skip this branch
/// of the traversal" in the crawler; nothing aborts a crawl.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP 429 on every attempt until the backoff budget ran out.
    #[error("rate limit budget exhausted after {attempts} attempts: {url}")]
    RateLimitExceeded { url: String, attempts: u32 },

    /// Any non-2xx, non-429 HTTP status. Never retried.
    #[error("request failed with status {status}: {url}")]
    Status { status: u16, url: String },

    /// Network/DNS failure before any status was received. Immediately
    /// fatal for this URL; there is no response to inspect.
    #[error("transport error fetching {url}")]
    Transport {
        url: String,
        #[source]
        source: wreq::Error,
    },
}

/// Trait for page fetching - enables mocking the site in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches a URL and returns the response body.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;

    /// Builds the search-results URL for a zero-based page index.
    fn search_url(&self, page: u32) -> String;

    /// Base URL used to resolve relative links found in markup.
    fn base_url(&self) -> String;
}

/// Backoff wait before attempt `attempt + 1`: `2^attempt` base units.
pub fn backoff_delay(attempt: u32, unit: Duration) -> Duration {
    unit * 2u32.saturating_pow(attempt)
}

/// AbeBooks HTTP client with browser impersonation, politeness delay, and
/// exponential backoff on rate limiting.
pub struct AbeClient {
    client: Client,
    delay_ms: u64,
    delay_jitter_ms: u64,
    page_step: u32,
    backoff_unit: Duration,
    base_url: Option<String>,
}

impl AbeClient {
    /// Creates a new client with the given configuration.
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        Self::with_base_url(config, None).await
    }

    /// Creates a new client with an optional custom base URL (for testing).
    pub async fn with_base_url(config: &Config, base_url: Option<String>) -> anyhow::Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url)?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
            page_step: config.page_step,
            backoff_unit: Duration::from_secs(1),
            base_url,
        })
    }

    /// Overrides the backoff base unit (tests shrink it to keep runs fast).
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Issues one GET and returns body on 2xx, the status on other codes.
    async fn get_once(&self, url: &str) -> Result<Result<String, u16>, FetchError> {
        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .send()
            .await
            .map_err(|source| FetchError::Transport { url: url.to_string(), source })?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|source| FetchError::Transport { url: url.to_string(), source })?;
            return Ok(Ok(body));
        }

        Ok(Err(status.as_u16()))
    }

    /// Adds a random delay between requests to mimic human behavior.
    async fn delay(&self) {
        if self.delay_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl PageFetcher for AbeClient {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.delay().await;

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            info!("GET {} (attempt {})", url, attempt);

            match self.get_once(url).await? {
                Ok(body) => return Ok(body),
                Err(429) => {
                    if attempt >= MAX_ATTEMPTS {
                        return Err(FetchError::RateLimitExceeded {
                            url: url.to_string(),
                            attempts: attempt,
                        });
                    }
                    let wait = backoff_delay(attempt, self.backoff_unit);
                    warn!("Rate limited (429). Retrying in {:?}", wait);
                    tokio::time::sleep(wait).await;
                }
                Err(status) => {
                    return Err(FetchError::Status { status, url: url.to_string() });
                }
            }
        }
    }

    fn search_url(&self, page: u32) -> String {
        format!(
            "{}/servlet/SearchResults?prevpage={}&bi=0&bsi={}&sortby=1&ds={}",
            self.base_url(),
            page,
            page * self.page_step,
            self.page_step
        )
    }

    fn base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| "https://www.abebooks.de".to_string())
    }
}
