//! bookbot-crawler - AbeBooks listing scraper and Bookbot price analysis CLI

use anyhow::Result;
use bookbot_crawler::commands::{AnalysisKind, AnalyzeCommand, ScrapeCommand};
use bookbot_crawler::config::{Config, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bookbot-crawler",
    version,
    about = "AbeBooks listing scraper and Bookbot price analysis CLI",
    long_about = "Scrapes book offers from AbeBooks with rate-limit backoff and runs \
                  descriptive statistics comparing Bookbot against other providers."
)]
struct Cli {
    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "BOOKBOT_PROXY")]
    proxy: Option<String>,

    /// Delay between requests in milliseconds
    #[arg(long, default_value = "2000", global = true, env = "BOOKBOT_DELAY")]
    delay: u64,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl AbeBooks listings and write the CSV artifact
    #[command(alias = "s")]
    Scrape {
        /// Stop after this many distinct ISBNs
        #[arg(short, long, default_value = "1000", env = "BOOKBOT_TARGET")]
        target: usize,

        /// Maximum number of search pages to fetch
        #[arg(long, default_value = "30")]
        max_pages: u32,

        /// Destination CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run an analysis over a previously scraped CSV artifact
    #[command(alias = "a")]
    Analyze {
        /// Analysis to run; omit for an interactive menu
        #[arg(long, value_enum)]
        analysis: Option<AnalysisKind>,

        /// CSV artifact to analyze
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Home country for the foreign-offers analysis
        #[arg(long)]
        home_country: Option<String>,

        /// Provider compared against the rest of the market
        #[arg(long)]
        provider: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    config.format = cli.format;
    config.delay_ms = cli.delay;

    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    match cli.command {
        Commands::Scrape { target, max_pages, output } => {
            config.target_count = target;
            config.max_pages = max_pages;
            if let Some(output) = output {
                config.output = output;
            }

            let cmd = ScrapeCommand::new(config);
            let summary = cmd.execute().await?;
            println!("{}", summary);
        }

        Commands::Analyze { analysis, input, home_country, provider } => {
            if let Some(input) = input {
                config.output = input;
            }
            if let Some(home_country) = home_country {
                config.home_country = home_country;
            }
            if let Some(provider) = provider {
                config.provider = provider;
            }

            let cmd = AnalyzeCommand::new(config);
            let output = cmd.execute(analysis)?;
            println!("{}", output);
        }
    }

    Ok(())
}
