//! Output formatting for data samples and analysis results (table, JSON).

use crate::config::OutputFormat;
use crate::stats::Record;
use serde::Serialize;

/// Result of one analysis, ready for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "analysis", rename_all = "snake_case")]
pub enum AnalysisReport {
    SoleProvider { provider: String, count: usize },
    PriceOutliers { provider: String, count: usize },
    LowerPricedProviders { provider: String, providers: Vec<String> },
    AverageDeviation { provider: String, eur: Option<f64> },
    ForeignOffers { home_country: String, pct: Option<f64> },
}

/// Formats samples and analysis reports for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a sample of dataset rows.
    pub fn format_sample(&self, records: &[Record]) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Table => self.table_sample(records),
        }
    }

    /// Formats one analysis result.
    pub fn format_report(&self, report: &AnalysisReport) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => Self::text_report(report),
        }
    }

    fn table_sample(&self, records: &[Record]) -> String {
        if records.is_empty() {
            return "No rows in dataset.".to_string();
        }

        let mut lines = Vec::with_capacity(records.len() + 2);
        lines.push(format!(
            "{:<15} {:<40} {:<25} {:<15} {:>8}",
            "ISBN13", "Title", "Provider", "Country", "Price"
        ));
        lines.push(format!("{:-<15} {:-<40} {:-<25} {:-<15} {:-<8}", "", "", "", "", ""));

        for r in records {
            lines.push(format!(
                "{:<15} {:<40} {:<25} {:<15} {:>8.2}",
                r.isbn,
                truncate(&r.title, 40),
                truncate(&r.provider, 25),
                truncate(&r.country, 15),
                r.price
            ));
        }

        lines.join("\n")
    }

    fn text_report(report: &AnalysisReport) -> String {
        match report {
            AnalysisReport::SoleProvider { provider, count } => {
                format!("Total occurrences where '{}' is the only provider: {}", provider, count)
            }
            AnalysisReport::PriceOutliers { provider, count } => {
                format!("Number of outliers found in {} prices: {}", provider, count)
            }
            AnalysisReport::LowerPricedProviders { provider, providers } => {
                if providers.is_empty() {
                    format!("No providers have a lower price than {}", provider)
                } else {
                    format!(
                        "Providers having a lower price than {}: {}",
                        provider,
                        providers.join(", ")
                    )
                }
            }
            AnalysisReport::AverageDeviation { provider, eur } => match eur {
                Some(eur) => format!(
                    "Average deviation of {}'s offers from the lowest price: {:.2} EUR",
                    provider, eur
                ),
                None => format!("{} has no offers in the dataset", provider),
            },
            AnalysisReport::ForeignOffers { home_country, pct } => match pct {
                Some(pct) => format!(
                    "Relative representation of foreign offers (excluding {}): {:.2}%",
                    home_country, pct
                ),
                None => "Dataset is empty".to_string(),
            },
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec() -> Record {
        Record {
            isbn: "9780000000001".to_string(),
            title: "Die Verwandlung".to_string(),
            provider: "Bookbot".to_string(),
            country: "Tschechien".to_string(),
            price: 30.0,
        }
    }

    #[test]
    fn test_table_sample_has_header_and_row() {
        let out = Formatter::new(OutputFormat::Table).format_sample(&[rec()]);
        assert!(out.contains("ISBN13"));
        assert!(out.contains("Die Verwandlung"));
        assert!(out.contains("30.00"));
    }

    #[test]
    fn test_table_sample_empty() {
        let out = Formatter::new(OutputFormat::Table).format_sample(&[]);
        assert_eq!(out, "No rows in dataset.");
    }

    #[test]
    fn test_json_sample_roundtrips() {
        let out = Formatter::new(OutputFormat::Json).format_sample(&[rec()]);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["provider"], "Bookbot");
    }

    #[test]
    fn test_foreign_offers_two_decimals() {
        let report = AnalysisReport::ForeignOffers {
            home_country: "Tschechien".to_string(),
            pct: Some(70.0),
        };
        let out = Formatter::new(OutputFormat::Table).format_report(&report);
        assert!(out.ends_with("70.00%"));
    }

    #[test]
    fn test_lower_priced_report_joins_names() {
        let report = AnalysisReport::LowerPricedProviders {
            provider: "Bookbot".to_string(),
            providers: vec!["Alpha".to_string(), "Zed".to_string()],
        };
        let out = Formatter::new(OutputFormat::Table).format_report(&report);
        assert!(out.contains("Alpha, Zed"));
    }

    #[test]
    fn test_json_report_tagged() {
        let report =
            AnalysisReport::SoleProvider { provider: "Bookbot".to_string(), count: 3 };
        let out = Formatter::new(OutputFormat::Json).format_report(&report);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["analysis"], "sole_provider");
        assert_eq!(parsed["count"], 3);
    }

    #[test]
    fn test_truncate_long_title() {
        let long = "x".repeat(60);
        let out = truncate(&long, 40);
        assert_eq!(out.chars().count(), 40);
        assert!(out.ends_with("..."));
    }
}
