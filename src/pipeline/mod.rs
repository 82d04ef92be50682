//! Pipeline entry points for scraping operations.
//!
//! - `discover_pages`: Read the page count of a category
//! - `run_scrape`: Scrape a category and summarize the result

pub mod scrape;
pub mod summary;

pub use scrape::{PageRequest, ScrapeReport, discover_pages, run_scrape, run_scrape_with};
pub use summary::ScrapeSummary;
