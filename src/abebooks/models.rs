//! Data models for scraped book offers.

use std::collections::HashSet;

/// A single book offer extracted from an expanded buying-options page.
///
/// The same ISBN may appear in many offers, once per provider listing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    /// ISBN-13 of the book (never empty for a retained offer)
    pub isbn: String,
    /// Listing title
    pub title: String,
    /// Seller name
    pub provider: String,
    /// Seller country, taken from the component after the last comma
    /// of the seller locale string
    pub country: String,
    /// Price as extracted from markup: a currency-less numeric string
    pub price: String,
    /// Index of the search page on which this offer's listing was discovered
    pub source_page: u32,
}

/// Append-ordered collection of offers accumulated across a crawl.
///
/// The crawler exclusively owns the corpus and is the only writer; it is
/// persisted once at crawl end. The distinct-ISBN count drives the crawl's
/// termination decision.
#[derive(Debug, Default)]
pub struct Corpus {
    offers: Vec<Offer>,
    seen_isbns: HashSet<String>,
}

impl Corpus {
    /// Creates an empty corpus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an offer. Offers with an empty ISBN are rejected upstream by
    /// the parser; pushing one here is a logic error and is ignored.
    pub fn push(&mut self, offer: Offer) {
        if offer.isbn.is_empty() {
            return;
        }
        self.seen_isbns.insert(offer.isbn.clone());
        self.offers.push(offer);
    }

    /// Number of offers accumulated (duplicates included).
    pub fn len(&self) -> usize {
        self.offers.len()
    }

    /// Returns true if no offers have been recorded.
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    /// Number of distinct ISBNs seen so far.
    pub fn distinct_isbns(&self) -> usize {
        self.seen_isbns.len()
    }

    /// All offers, in append order.
    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    /// The first `limit` distinct ISBNs, in order of first appearance in the
    /// append-ordered offer sequence.
    ///
    /// "First" is deliberately defined by offer insertion order, not by any
    /// set iteration order, so the retained key set is deterministic.
    pub fn retained_isbns(&self, limit: usize) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut retained = Vec::new();

        for offer in &self.offers {
            if retained.len() == limit {
                break;
            }
            if seen.insert(offer.isbn.as_str()) {
                retained.push(offer.isbn.as_str());
            }
        }

        retained
    }
}
