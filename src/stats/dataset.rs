//! Tabular dataset loaded from the scrape artifact.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// One analysis-side row. `Scanned_Page` is stripped at load time; the
/// analyses never see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub isbn: String,
    pub title: String,
    pub provider: String,
    pub country: String,
    pub price: f64,
}

/// In-memory dataset the five analyses run over.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Builds a dataset from already-parsed records.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Loads the CSV artifact written by the scrape command.
    ///
    /// Columns are located by header name, so column order does not matter.
    /// Rows with an unparsable price are skipped with a warning.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset: {}", path.display()))?;

        let mut rows = parse_csv(&content).into_iter();
        let header = rows.next().context("Dataset is empty")?;
        let columns: Vec<&str> = header.iter().map(|c| c.as_str()).collect();

        let isbn_idx = column_index(&columns, "ISBN13")?;
        let title_idx = column_index(&columns, "Title")?;
        let provider_idx = column_index(&columns, "Provider")?;
        let country_idx = column_index(&columns, "Country")?;
        let price_idx = column_index(&columns, "Price")?;

        let max_idx = [isbn_idx, title_idx, provider_idx, country_idx, price_idx]
            .into_iter()
            .max()
            .unwrap_or(0);

        let mut records = Vec::new();
        for (row_no, fields) in rows.enumerate() {
            if fields.len() <= max_idx {
                warn!("Skipping short record {} in {}", row_no + 2, path.display());
                continue;
            }

            let price: f64 = match fields[price_idx].parse() {
                Ok(p) => p,
                Err(_) => {
                    warn!("Skipping record {} with unparsable price", row_no + 2);
                    continue;
                }
            };

            records.push(Record {
                isbn: fields[isbn_idx].clone(),
                title: fields[title_idx].clone(),
                provider: fields[provider_idx].clone(),
                country: fields[country_idx].clone(),
                price,
            });
        }

        debug!("Loaded {} records from {}", records.len(), path.display());
        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first `n` records, for the display layer's data sample.
    pub fn sample(&self, n: usize) -> &[Record] {
        &self.records[..self.records.len().min(n)]
    }
}

fn column_index(columns: &[&str], name: &str) -> Result<usize> {
    match columns.iter().position(|c| *c == name) {
        Some(idx) => Ok(idx),
        None => bail!("Dataset is missing the {} column", name),
    }
}

/// Splits CSV content into records, honoring double-quoted fields with
/// escaped quotes. Quote state carries across newlines, so a quoted field
/// containing a line break stays one field of one record.
fn parse_csv(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                // Blank lines between records are not records.
                if fields.is_empty() && current.trim().is_empty() {
                    current.clear();
                    continue;
                }
                fields.push(std::mem::take(&mut current));
                records.push(std::mem::take(&mut fields));
            }
            _ => current.push(c),
        }
    }
    if !fields.is_empty() || !current.trim().is_empty() {
        fields.push(current);
        records.push(fields);
    }
    records
}
