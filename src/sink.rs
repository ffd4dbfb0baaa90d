//! CSV persistence for a crawled corpus, filtered to the first N unique ISBNs.

use crate::abebooks::{Corpus, Offer};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// CSV column header for the scrape artifact.
pub const CSV_HEADER: &str = "ISBN13,Title,Provider,Country,Price,Scanned_Page";

/// Sink persistence failure. Unlike fetch errors this is fatal for a run.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write output file")]
    Io(#[from] std::io::Error),
}

/// Accumulates offers and serializes them to a CSV file.
///
/// At flush time the sink retains the first `target_count` distinct ISBNs in
/// order of first appearance, then writes every offer whose ISBN is in that
/// set. Duplicate rows are intentional: an ISBN appears once per offer.
pub struct CsvSink {
    corpus: Corpus,
    target_count: usize,
}

impl CsvSink {
    /// Creates an empty sink.
    pub fn new(target_count: usize) -> Self {
        Self { corpus: Corpus::new(), target_count }
    }

    /// Wraps a corpus produced by the crawler.
    pub fn from_corpus(corpus: Corpus, target_count: usize) -> Self {
        Self { corpus, target_count }
    }

    /// Appends one offer to the in-memory sequence.
    pub fn record(&mut self, offer: Offer) {
        self.corpus.push(offer);
    }

    /// Offers whose ISBN made the first-N cut, in append order.
    fn retained_offers(&self) -> Vec<&Offer> {
        let retained: HashSet<&str> =
            self.corpus.retained_isbns(self.target_count).into_iter().collect();

        self.corpus.offers().iter().filter(|o| retained.contains(o.isbn.as_str())).collect()
    }

    /// Renders the retained offers as CSV text. Deterministic for a given
    /// corpus, so flushing twice yields byte-identical files.
    pub fn to_csv(&self) -> String {
        let mut lines = Vec::with_capacity(self.corpus.len() + 1);
        lines.push(CSV_HEADER.to_string());

        for offer in self.retained_offers() {
            lines.push(format!(
                "{},{},{},{},{},{}",
                csv_escape(&offer.isbn),
                csv_escape(&offer.title),
                csv_escape(&offer.provider),
                csv_escape(&offer.country),
                csv_escape(&offer.price),
                offer.source_page
            ));
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    /// Writes the CSV artifact to `path` and returns the number of data rows.
    pub fn flush(&self, path: &Path) -> Result<usize, SinkError> {
        let rows = self.retained_offers().len();

        std::fs::write(path, self.to_csv())?;
        info!("Wrote {} rows to {}", rows, path.display());
        Ok(rows)
    }
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn offer(isbn: &str, provider: &str, price: &str, page: u32) -> Offer {
        Offer {
            isbn: isbn.to_string(),
            title: format!("Title {}", isbn),
            provider: provider.to_string(),
            country: "Deutschland".to_string(),
            price: price.to_string(),
            source_page: page,
        }
    }

    #[test]
    fn test_header_only_when_empty() {
        let sink = CsvSink::new(10);
        assert_eq!(sink.to_csv(), format!("{}\n", CSV_HEADER));
    }

    #[test]
    fn test_retains_first_n_distinct_isbns() {
        let mut sink = CsvSink::new(2);
        sink.record(offer("A", "Bookbot", "10.00", 0));
        sink.record(offer("B", "Bookbot", "11.00", 0));
        sink.record(offer("C", "Bookbot", "12.00", 1));
        sink.record(offer("A", "Other", "9.00", 1));

        let csv = sink.to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        // Header plus both A rows and the B row; C falls past the cutoff.
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| !l.starts_with("C,")));
        assert_eq!(lines.iter().filter(|l| l.starts_with("A,")).count(), 2);
    }

    #[test]
    fn test_duplicate_rows_included() {
        let mut sink = CsvSink::new(10);
        sink.record(offer("A", "Bookbot", "10.00", 0));
        sink.record(offer("A", "Other", "8.00", 0));

        let csv = sink.to_csv();
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_csv_escaping() {
        let mut sink = CsvSink::new(10);
        let mut o = offer("A", "Buch & Co, Berlin", "10.00", 0);
        o.title = "Say \"hello\"".to_string();
        sink.record(o);

        let csv = sink.to_csv();
        assert!(csv.contains("\"Buch & Co, Berlin\""));
        assert!(csv.contains("\"Say \"\"hello\"\"\""));
    }

    #[test]
    fn test_flush_idempotent() {
        let mut sink = CsvSink::new(5);
        for (isbn, price) in [("A", "10.00"), ("B", "20.00"), ("A", "5.00")] {
            sink.record(offer(isbn, "Bookbot", price, 2));
        }

        let dir = tempdir().unwrap();
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");

        let rows_a = sink.flush(&first).unwrap();
        let rows_b = sink.flush(&second).unwrap();

        assert_eq!(rows_a, 3);
        assert_eq!(rows_b, 3);
        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    }

    #[test]
    fn test_flush_unwritable_path_fails() {
        let sink = CsvSink::new(5);
        let err = sink.flush(Path::new("/nonexistent-dir/out.csv")).unwrap_err();
        assert!(matches!(err, SinkError::Io(_)));
    }

    #[test]
    fn test_header_shape() {
        let sink = CsvSink::new(1);
        assert!(sink.to_csv().starts_with("ISBN13,Title,Provider,Country,Price,Scanned_Page\n"));
    }
}
