//! Vehicle crawler CLI
//!
//! Local entry point: scrapes one category and prints the records.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use vehicle_crawler::{
    error::Result,
    models::{Category, Config},
    pipeline::{self, PageRequest, ScrapeReport},
    utils::console,
};

/// vehicle-crawler - dakar-auto.com listing scraper
#[derive(Parser, Debug)]
#[command(
    name = "vehicle-crawler",
    version,
    about = "Scrapes vehicle listings into normalized records"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the supported categories
    Categories,

    /// Show how many listing pages a category has
    Pages {
        /// cars, motorcycles or rentals
        category: Category,
    },

    /// Scrape listings of a category
    Scrape {
        /// cars, motorcycles or rentals
        category: Category,

        /// Number of pages to scrape (capped at the available count)
        #[arg(short, long, default_value_t = 1)]
        pages: u32,

        /// Scrape every available page
        #[arg(long, conflicts_with = "pages")]
        all: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Validate the configuration file
    Validate,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    /// Records as pretty-printed JSON on stdout
    Json,
    /// Aggregate figures only
    Summary,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_summary(report: &ScrapeReport) {
    let summary = &report.summary;
    let price = |p: Option<u64>| p.map_or_else(|| "-".to_string(), |v| format!("{v} FCFA"));

    console::summary(
        report.category.label(),
        &[
            ("Listings", summary.listings.to_string()),
            (
                "Pages",
                format!("{}/{}", report.pages_scraped, report.max_pages),
            ),
            ("Failed pages", report.stats.pages_failed.to_string()),
            ("Skipped listings", report.stats.listings_skipped.to_string()),
            ("Mean price", price(summary.mean_price)),
            ("Max price", price(summary.max_price)),
            ("Elapsed", format!("{:.1}s", report.stats.elapsed_secs())),
        ],
    );

    if !summary.top_brands.is_empty() {
        console::summary(
            "Top brands",
            &summary
                .top_brands
                .iter()
                .map(|(brand, count)| (brand.as_str(), count.to_string()))
                .collect::<Vec<_>>(),
        );
    }
    if !summary.listings_by_year.is_empty() {
        let years: Vec<(String, String)> = summary
            .listings_by_year
            .iter()
            .map(|(year, count)| (year.to_string(), count.to_string()))
            .collect();
        console::summary(
            "Listings per year",
            &years
                .iter()
                .map(|(year, count)| (year.as_str(), count.clone()))
                .collect::<Vec<_>>(),
        );
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    log::debug!("Configuration: {:?}", config);

    match cli.command {
        Command::Categories => {
            let base = config.site.base_url()?;
            for category in Category::ALL {
                println!(
                    "{:<12} {:<24} {}",
                    category.name(),
                    category.label(),
                    category.landing_url(&base)?
                );
            }
        }

        Command::Pages { category } => {
            let pages = pipeline::discover_pages(&config, category).await?;
            println!("{pages}");
        }

        Command::Scrape {
            category,
            pages,
            all,
            format,
        } => {
            config.validate()?;
            let request = if all {
                PageRequest::All
            } else {
                PageRequest::First(pages)
            };

            let report = pipeline::run_scrape(&config, category, request).await?;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&report.outcome.records)?);
                }
                OutputFormat::Summary => print_summary(&report),
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({})", cli.config.display());
        }
    }

    Ok(())
}
