// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod category;
mod config;
mod listing;

// Re-export all public types
pub use category::{Category, PropertyField};
pub use config::{Config, CrawlerConfig, SelectorConfig, SiteConfig};
pub use listing::{ListingRecord, RawListing, VehicleDetails};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Timing and counters for one scrape run.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub record_count: usize,
    pub pages_failed: usize,
    pub listings_skipped: usize,
}

impl ScrapeStats {
    pub fn elapsed_secs(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}
