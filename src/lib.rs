//! bookbot-crawler - AbeBooks listing scraper and Bookbot price analysis CLI
//!
//! Scrapes book offers (ISBN, title, provider, country, price) from AbeBooks
//! with rate-limit backoff, persists them as CSV, and runs descriptive
//! statistics comparing the Bookbot provider against competitors.

pub mod abebooks;
pub mod commands;
pub mod config;
pub mod crawler;
pub mod format;
pub mod sink;
pub mod stats;

pub use abebooks::{Corpus, Offer};
pub use config::Config;
pub use crawler::Crawler;
pub use sink::CsvSink;
