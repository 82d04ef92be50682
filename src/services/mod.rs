//! Service layer for the crawler application.
//!
//! This module contains the business logic for:
//! - Field cleaning (`normalize`)
//! - Page-count discovery (`PageCounter`)
//! - Listing extraction (`ListingExtractor`)
//! - Category scraping (`CategoryScraper`)

pub mod listings;
pub mod normalize;
pub mod pages;
pub mod scrape;

pub use listings::{ListingExtractor, PageExtract};
pub use pages::PageCounter;
pub use scrape::{CategoryScraper, PageProgress, ScrapeOutcome};

use crate::error::{AppError, Result};

/// Compile a CSS selector, reporting the offending selector on failure.
pub(crate) fn parse_selector(s: &str) -> Result<scraper::Selector> {
    scraper::Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
