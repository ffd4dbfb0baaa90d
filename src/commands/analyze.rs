//! Analyze command: data sample plus one of five analyses over the artifact.

use crate::config::Config;
use crate::format::{AnalysisReport, Formatter};
use crate::stats::{self, Dataset};
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::io::{BufRead, Write};

/// The five selectable analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnalysisKind {
    /// Count ISBNs where the named provider is the only provider
    SoleProvider,
    /// Count the named provider's price outliers per ISBN
    Outliers,
    /// Providers with a lower mean price than the named provider
    LowerPriced,
    /// Average deviation of the named provider from the lowest price
    Deviation,
    /// Share of offers outside the home country
    ForeignOffers,
}

impl AnalysisKind {
    fn menu_label(&self) -> &'static str {
        match self {
            AnalysisKind::SoleProvider => "Count Bookbot Only Provider",
            AnalysisKind::Outliers => "Count Outliers in Bookbot Prices",
            AnalysisKind::LowerPriced => "Providers having a lower price than Bookbot",
            AnalysisKind::Deviation => "Average Deviation from Lowest Price",
            AnalysisKind::ForeignOffers => "Calculate Foreign Offers Representation",
        }
    }

    const ALL: [AnalysisKind; 5] = [
        AnalysisKind::SoleProvider,
        AnalysisKind::Outliers,
        AnalysisKind::LowerPriced,
        AnalysisKind::Deviation,
        AnalysisKind::ForeignOffers,
    ];
}

/// Loads the dataset and renders a sample plus one analysis.
pub struct AnalyzeCommand {
    config: Config,
}

impl AnalyzeCommand {
    /// Creates a new analyze command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Executes the analysis. With `analysis` unset, an interactive numbered
    /// menu on stdin selects one.
    pub fn execute(&self, analysis: Option<AnalysisKind>) -> Result<String> {
        let dataset = Dataset::load(&self.config.output)?;

        let kind = match analysis {
            Some(kind) => kind,
            None => {
                let stdin = std::io::stdin();
                let stdout = std::io::stdout();
                select_analysis(stdin.lock(), stdout.lock())?
            }
        };

        let formatter = Formatter::new(self.config.format);
        let sample = formatter.format_sample(dataset.sample(10));
        let report = formatter.format_report(&self.run(kind, &dataset));

        Ok(format!("Sample of the data:\n{}\n\n{}", sample, report))
    }

    /// Runs one analysis over a loaded dataset.
    pub fn run(&self, kind: AnalysisKind, dataset: &Dataset) -> AnalysisReport {
        let provider = self.config.provider.clone();
        match kind {
            AnalysisKind::SoleProvider => AnalysisReport::SoleProvider {
                count: stats::sole_provider_count(dataset, &provider),
                provider,
            },
            AnalysisKind::Outliers => AnalysisReport::PriceOutliers {
                count: stats::price_outlier_count(dataset, &provider),
                provider,
            },
            AnalysisKind::LowerPriced => AnalysisReport::LowerPricedProviders {
                providers: stats::lower_priced_providers(dataset, &provider),
                provider,
            },
            AnalysisKind::Deviation => AnalysisReport::AverageDeviation {
                eur: stats::average_deviation_from_lowest(dataset, &provider),
                provider,
            },
            AnalysisKind::ForeignOffers => AnalysisReport::ForeignOffers {
                pct: stats::foreign_offers_pct(dataset, &self.config.home_country),
                home_country: self.config.home_country.clone(),
            },
        }
    }
}

/// Prints the numbered analysis menu and reads a selection.
fn select_analysis(mut input: impl BufRead, mut output: impl Write) -> Result<AnalysisKind> {
    writeln!(output, "Select an analysis:")?;
    for (i, kind) in AnalysisKind::ALL.iter().enumerate() {
        writeln!(output, "  {}. {}", i + 1, kind.menu_label())?;
    }
    write!(output, "> ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read selection")?;

    let choice: usize = match line.trim().parse() {
        Ok(n) => n,
        Err(_) => bail!("Invalid selection: {}", line.trim()),
    };
    match AnalysisKind::ALL.get(choice.wrapping_sub(1)) {
        Some(kind) => Ok(*kind),
        None => bail!("Selection out of range: {}", choice),
    }
}
