//! AbeBooks-specific modules for HTTP fetching, parsing, and data models.

pub mod client;
pub mod models;
pub mod parser;
pub mod selectors;

pub use client::{AbeClient, FetchError, PageFetcher};
pub use models::{Corpus, Offer};
