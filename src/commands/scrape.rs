//! Scrape command implementation.

use crate::abebooks::{AbeClient, PageFetcher};
use crate::config::Config;
use crate::crawler::Crawler;
use crate::sink::CsvSink;
use anyhow::{Context, Result};
use std::time::Instant;
use tracing::info;

/// Runs a full crawl and persists the CSV artifact.
pub struct ScrapeCommand {
    config: Config,
}

impl ScrapeCommand {
    /// Creates a new scrape command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Executes the crawl and returns a text summary.
    pub async fn execute(&self) -> Result<String> {
        let client =
            AbeClient::new(&self.config).await.context("Failed to create HTTP client")?;

        self.execute_with_fetcher(&client).await
    }

    /// Executes the crawl with a provided fetcher (for testing).
    pub async fn execute_with_fetcher(&self, fetcher: &impl PageFetcher) -> Result<String> {
        let start = Instant::now();

        info!(
            "Starting crawl: target {} distinct ISBNs over at most {} pages",
            self.config.target_count, self.config.max_pages
        );

        let crawler =
            Crawler::new(fetcher, self.config.target_count, self.config.max_pages);
        let corpus = crawler.run().await;

        let distinct = corpus.distinct_isbns();
        let sink = CsvSink::from_corpus(corpus, self.config.target_count);
        let rows = sink
            .flush(&self.config.output)
            .with_context(|| format!("Failed to persist {}", self.config.output.display()))?;

        let elapsed = start.elapsed();
        Ok(format!(
            "Wrote {} offers ({} distinct ISBNs) to {} in {:.1}s",
            rows,
            distinct,
            self.config.output.display(),
            elapsed.as_secs_f64()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abebooks::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tempfile::tempdir;

    struct MockFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageFetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Status { status: 404, url: url.to_string() })
        }

        fn search_url(&self, page: u32) -> String {
            format!("https://test.example/search?page={}", page)
        }

        fn base_url(&self) -> String {
            "https://test.example".to_string()
        }
    }

    #[tokio::test]
    async fn test_scrape_writes_artifact() {
        let pages: HashMap<String, String> = [
            (
                "https://test.example/search?page=0",
                r#"<html><ul><li data-cy="listing-item">
                   <a id="listing-1" href="/d1">x</a></li></ul></html>"#,
            ),
            (
                "https://test.example/d1",
                r#"<html><hr id="hr1"><div id="more-buying-options">
                   <a id="view-all-listings" href="/e1">alle</a></div></html>"#,
            ),
            (
                "https://test.example/e1",
                r#"<html><li data-cy="listing-item">
                   <meta itemprop="price" content="30.00">
                   <meta itemprop="isbn" content="9780000000001">
                   <span data-cy="listing-title">T</span>
                   <a data-cy="listing-seller-link">Bookbot</a> Praha, Tschechien
                   </li></html>"#,
            ),
        ]
        .into_iter()
        .map(|(u, h)| (u.to_string(), h.to_string()))
        .collect();

        let dir = tempdir().unwrap();
        let output = dir.path().join("out.csv");

        let mut config = Config::default();
        config.target_count = 1;
        config.max_pages = 5;
        config.output = output.clone();

        let summary = ScrapeCommand::new(config)
            .execute_with_fetcher(&MockFetcher { pages })
            .await
            .unwrap();

        assert!(summary.contains("1 offers"));
        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.starts_with("ISBN13,Title,Provider,Country,Price,Scanned_Page"));
        assert!(content.contains("9780000000001,T,Bookbot,Tschechien,30.00,0"));
    }

    #[tokio::test]
    async fn test_scrape_unwritable_output_is_fatal() {
        let mut config = Config::default();
        config.output = "/nonexistent-dir/out.csv".into();

        let result = ScrapeCommand::new(config)
            .execute_with_fetcher(&MockFetcher { pages: HashMap::new() })
            .await;

        assert!(result.is_err());
    }
}
