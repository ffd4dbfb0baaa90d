//! Crawl driver: search page -> detail page -> expanded buying-options page.
//!
//! A single sequential worker walks search pages in order. Each page's
//! detail links are processed to completion (or early termination) before
//! the next search page is fetched. The crawler exclusively owns the corpus;
//! nothing else writes to it.

use crate::abebooks::{parser, Corpus, PageFetcher};
use tracing::{debug, info, warn};

/// Traversal controller enforcing the distinct-ISBN target and page budget.
pub struct Crawler<'a, F: PageFetcher> {
    fetcher: &'a F,
    target_count: usize,
    max_pages: u32,
    corpus: Corpus,
}

impl<'a, F: PageFetcher> Crawler<'a, F> {
    /// Creates a crawler with an empty corpus.
    pub fn new(fetcher: &'a F, target_count: usize, max_pages: u32) -> Self {
        Self { fetcher, target_count, max_pages, corpus: Corpus::new() }
    }

    fn target_reached(&self) -> bool {
        self.corpus.distinct_isbns() >= self.target_count
    }

    /// Runs the crawl to completion and returns the accumulated corpus.
    ///
    /// Termination: distinct-ISBN target reached, page budget spent, or a
    /// search page with no listings. Fetch failures on any single URL skip
    /// that branch of the traversal and never abort the crawl.
    pub async fn run(mut self) -> Corpus {
        let mut page = 0;

        'pages: while page < self.max_pages && !self.target_reached() {
            let url = self.fetcher.search_url(page);
            info!("Scanning URL: {}", url);

            let html = match self.fetcher.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Search page {} failed, skipping: {}", page, e);
                    page += 1;
                    continue;
                }
            };

            let links = parser::listing_links(&html, &self.fetcher.base_url());
            if links.is_empty() {
                debug!("No listings on page {}, end of results", page);
                break;
            }

            for link in links {
                if self.target_reached() {
                    break 'pages;
                }
                self.visit_listing(&link, page).await;
            }

            page += 1;
        }

        info!(
            "Crawl finished: {} offers, {} distinct ISBNs",
            self.corpus.len(),
            self.corpus.distinct_isbns()
        );
        self.corpus
    }

    /// Follows one detail link and, when an expanded buying-options page
    /// exists, extracts its offers into the corpus.
    ///
    /// Detail pages without a more-buying-options section carry only a
    /// single offer and are dropped: offers are extracted exclusively from
    /// expanded pages (see `parser::more_offers_link`).
    async fn visit_listing(&mut self, link: &str, page: u32) {
        let detail_html = match self.fetcher.fetch(link).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Error fetching link {}: {}", link, e);
                return;
            }
        };

        let Some(expanded_url) = parser::more_offers_link(&detail_html, &self.fetcher.base_url())
        else {
            debug!("No expanded buying options for {}, dropping listing", link);
            return;
        };

        let expanded_html = match self.fetcher.fetch(&expanded_url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Error fetching buying options link {}: {}", expanded_url, e);
                return;
            }
        };

        for offer in parser::offers(&expanded_html, page) {
            debug!(
                "Item: {}, {}, {}, {}, {}, {}",
                offer.isbn, offer.title, offer.country, offer.provider, offer.price, page
            );
            self.corpus.push(offer);
            if self.target_reached() {
                break;
            }
        }
    }
}
