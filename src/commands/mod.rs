//! CLI command implementations.

pub mod analyze;
pub mod scrape;

pub use analyze::{AnalysisKind, AnalyzeCommand};
pub use scrape::ScrapeCommand;
