//! Aggregate figures over a set of scraped records.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::models::ListingRecord;

/// How many brands [`ScrapeSummary::top_brands`] keeps.
const TOP_BRANDS: usize = 10;

/// Totals shown after a scrape: counts, prices, brands and years.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScrapeSummary {
    pub listings: usize,

    /// Mean over records that have a price
    pub mean_price: Option<u64>,
    pub max_price: Option<u64>,

    /// Most frequent brands, highest count first, ties by name
    pub top_brands: Vec<(String, usize)>,

    /// Listing count per model year, ascending
    pub listings_by_year: BTreeMap<u32, usize>,
}

impl ScrapeSummary {
    pub fn from_records(records: &[ListingRecord]) -> Self {
        let prices: Vec<u64> = records.iter().filter_map(|r| r.price).collect();
        let mean_price = if prices.is_empty() {
            None
        } else {
            let total: u128 = prices.iter().map(|&p| u128::from(p)).sum();
            u64::try_from(total / prices.len() as u128).ok()
        };

        let mut brand_counts: HashMap<&str, usize> = HashMap::new();
        for record in records {
            *brand_counts.entry(record.brand.as_str()).or_default() += 1;
        }
        let mut top_brands: Vec<(String, usize)> = brand_counts
            .into_iter()
            .map(|(brand, count)| (brand.to_string(), count))
            .collect();
        top_brands.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_brands.truncate(TOP_BRANDS);

        let mut listings_by_year: BTreeMap<u32, usize> = BTreeMap::new();
        for year in records.iter().filter_map(|r| r.year) {
            *listings_by_year.entry(year).or_default() += 1;
        }

        Self {
            listings: records.len(),
            mean_price,
            max_price: prices.iter().copied().max(),
            top_brands,
            listings_by_year,
        }
    }
}
