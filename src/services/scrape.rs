// src/services/scrape.rs

//! Category scraper service.
//!
//! Walks the listing pages of one category, extracts and normalizes every
//! listing, and reports progress after each page.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::Instant;
use url::Url;

use crate::error::Result;
use crate::models::{Category, Config, ListingRecord};
use crate::services::ListingExtractor;
use crate::services::normalize::normalize;
use crate::utils::http::PageFetcher;

/// Summary of a scrape run.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    /// Records in page order, then document order within a page
    pub records: Vec<ListingRecord>,
    pub pages_total: u32,
    pub pages_failed: usize,
    pub listings_skipped: usize,
}

/// Progress notification, sent once per attempted page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    pub page: u32,
    pub total: u32,
    /// Records collected from this page
    pub records: usize,
    pub failed: bool,
}

impl PageProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            f64::from(self.page) / f64::from(self.total)
        }
    }
}

struct PageResult {
    records: Vec<ListingRecord>,
    skipped: usize,
}

/// Hands out request start times at least `delay` apart.
///
/// A start is also never earlier than `delay` after the last finished
/// request, so a sequential run waits the full delay between pages.
#[derive(Debug)]
struct RequestPacer {
    delay: Duration,
    next_start: Mutex<Option<Instant>>,
}

impl RequestPacer {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_start: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Instant>> {
        self.next_start
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reserve the next start slot and wait for it.
    async fn wait_turn(&self) {
        let slot = {
            let mut next = self.lock();
            let now = Instant::now();
            let slot = next.map_or(now, |at| at.max(now));
            *next = Some(slot + self.delay);
            slot
        };
        if slot > Instant::now() {
            tokio::time::sleep_until(slot).await;
        }
    }

    /// Push the next free slot past `delay` from now.
    fn finished(&self) {
        let mut next = self.lock();
        let after = Instant::now() + self.delay;
        *next = Some(next.map_or(after, |at| at.max(after)));
    }
}

/// Service scraping the listing pages of a category.
pub struct CategoryScraper {
    fetcher: Arc<dyn PageFetcher>,
    extractor: ListingExtractor,
    base_url: Url,
    pacer: RequestPacer,
    concurrency: usize,
}

impl CategoryScraper {
    /// Create a scraper with the given configuration.
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &Config) -> Result<Self> {
        Ok(Self {
            fetcher,
            extractor: ListingExtractor::new(&config.selectors)?,
            base_url: config.site.base_url()?,
            pacer: RequestPacer::new(Duration::from_millis(config.crawler.request_delay_ms)),
            concurrency: config.crawler.max_concurrent.max(1),
        })
    }

    /// Scrape pages `1..=page_count` of `category`.
    ///
    /// Never fails: a page that cannot be fetched is logged and skipped.
    /// `on_progress` is called after every page, in page order. Request
    /// starts are spaced by `request_delay_ms` whatever the concurrency.
    pub async fn run<F>(
        &self,
        category: Category,
        page_count: u32,
        mut on_progress: F,
    ) -> ScrapeOutcome
    where
        F: FnMut(PageProgress),
    {
        let mut outcome = ScrapeOutcome {
            pages_total: page_count,
            ..ScrapeOutcome::default()
        };

        // `buffered` keeps results in page order even when fetches overlap.
        let mut pages = stream::iter(1..=page_count)
            .map(|page| async move { (page, self.scrape_page(category, page).await) })
            .buffered(self.concurrency);

        while let Some((page, result)) = pages.next().await {
            let progress = match result {
                Ok(PageResult { records, skipped }) => {
                    log::debug!(
                        "{} page {}/{}: {} listings, {} skipped",
                        category,
                        page,
                        page_count,
                        records.len(),
                        skipped
                    );
                    outcome.listings_skipped += skipped;
                    let count = records.len();
                    outcome.records.extend(records);
                    PageProgress {
                        page,
                        total: page_count,
                        records: count,
                        failed: false,
                    }
                }
                Err(error) => {
                    outcome.pages_failed += 1;
                    log::warn!("Failed to scrape {} page {}: {}", category, page, error);
                    PageProgress {
                        page,
                        total: page_count,
                        records: 0,
                        failed: true,
                    }
                }
            };
            on_progress(progress);
        }

        outcome
    }

    async fn scrape_page(&self, category: Category, page: u32) -> Result<PageResult> {
        let url = category.page_url(&self.base_url, page)?;

        self.pacer.wait_turn().await;
        let fetched = self.fetcher.fetch(&url).await;
        self.pacer.finished();
        let html = fetched?;
        let extract = self.extractor.extract(&html, category);

        Ok(PageResult {
            records: extract
                .listings
                .iter()
                .map(|raw| normalize(raw, category))
                .collect(),
            skipped: extract.skipped,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;
    use crate::models::VehicleDetails;
    use crate::services::listings::tests::{card, page};

    /// Serves fixed bodies by URL; any other URL fails like a dead host.
    #[derive(Default)]
    pub(crate) struct FixtureFetcher {
        pages: HashMap<String, String>,
        pub(crate) requests: Mutex<Vec<String>>,
    }

    impl FixtureFetcher {
        pub(crate) fn with(mut self, url: &str, body: String) -> Self {
            self.pages.insert(url.to_string(), body);
            self
        }
    }

    #[async_trait]
    impl PageFetcher for FixtureFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::crawl(url, "connection timed out"))
        }
    }

    pub(crate) fn test_config() -> Config {
        let mut config = Config::default();
        config.crawler.request_delay_ms = 0;
        config
    }

    const PROPS: &[&str] = &["Occasion", "120 000 km", "Manuelle", "Diesel"];

    fn three_cars() -> String {
        page(&[
            card("TOYOTA COROLLA2015", "6 500 000 F CFA", PROPS, Some("par Awa")),
            card("HYUNDAI TUCSON2019", "12 000 000 F CFA", PROPS, None),
            card("RENAULT CLIO2011", "N/A", &["Occasion"], Some("par Ibou")),
        ])
    }

    #[tokio::test]
    async fn test_failed_page_is_skipped_and_reported() {
        let fetcher = FixtureFetcher::default().with(
            "https://dakar-auto.com/senegal/voitures-4?&page=1",
            three_cars(),
        );
        let scraper = CategoryScraper::new(Arc::new(fetcher), &test_config()).unwrap();

        let mut progress = Vec::new();
        let outcome = scraper
            .run(Category::Cars, 2, |p| progress.push(p))
            .await;

        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.pages_total, 2);
        assert_eq!(outcome.pages_failed, 1);
        assert_eq!(
            progress,
            vec![
                PageProgress {
                    page: 1,
                    total: 2,
                    records: 3,
                    failed: false,
                },
                PageProgress {
                    page: 2,
                    total: 2,
                    records: 0,
                    failed: true,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_car_records_carry_all_properties() {
        let fetcher = FixtureFetcher::default().with(
            "https://dakar-auto.com/senegal/voitures-4?&page=1",
            three_cars(),
        );
        let scraper = CategoryScraper::new(Arc::new(fetcher), &test_config()).unwrap();
        let outcome = scraper.run(Category::Cars, 1, |_| {}).await;

        let first = &outcome.records[0];
        assert_eq!(first.brand, "TOYOTA COROLLA");
        assert_eq!(first.year, Some(2015));
        assert_eq!(first.price, Some(6_500_000));
        assert_eq!(first.owner, "AWA");
        assert_eq!(
            first.details,
            VehicleDetails::Car {
                mileage: Some(120_000),
                transmission: Some("MANUELLE".to_string()),
                fuel_type: Some("DIESEL".to_string()),
            }
        );

        let last = &outcome.records[2];
        assert_eq!(last.price, None);
        assert_eq!(
            last.details,
            VehicleDetails::Car {
                mileage: None,
                transmission: None,
                fuel_type: None,
            }
        );
        assert!(
            outcome
                .records
                .iter()
                .all(|r| matches!(r.details, VehicleDetails::Car { .. }))
        );
    }

    #[tokio::test]
    async fn test_rental_records_have_no_vehicle_properties() {
        let fetcher = FixtureFetcher::default().with(
            "https://dakar-auto.com/senegal/location-de-voitures-19?&page=1",
            three_cars(),
        );
        let scraper = CategoryScraper::new(Arc::new(fetcher), &test_config()).unwrap();
        let outcome = scraper.run(Category::RentalVehicles, 1, |_| {}).await;

        assert_eq!(outcome.records.len(), 3);
        assert!(
            outcome
                .records
                .iter()
                .all(|r| r.details == VehicleDetails::Rental)
        );
    }

    #[tokio::test]
    async fn test_order_preserved_with_concurrent_fetches() {
        let mut fetcher = FixtureFetcher::default();
        for n in 1..=4 {
            fetcher = fetcher.with(
                &format!("https://dakar-auto.com/senegal/motos-and-scooters-3?&page={n}"),
                page(&[
                    card(&format!("MOTO A{n}2020"), "1", &[], None),
                    card(&format!("MOTO B{n}2021"), "1", &[], None),
                ]),
            );
        }
        let mut config = test_config();
        config.crawler.max_concurrent = 3;
        let scraper = CategoryScraper::new(Arc::new(fetcher), &config).unwrap();

        let mut pages_seen = Vec::new();
        let outcome = scraper
            .run(Category::Motorcycles, 4, |p| pages_seen.push(p.page))
            .await;

        let brands: Vec<_> = outcome.records.iter().map(|r| r.brand.as_str()).collect();
        assert_eq!(
            brands,
            ["MOTO A1", "MOTO B1", "MOTO A2", "MOTO B2", "MOTO A3", "MOTO B3", "MOTO A4", "MOTO B4"]
        );
        assert_eq!(pages_seen, [1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_zero_pages_fetches_nothing() {
        let fetcher = Arc::new(FixtureFetcher::default());
        let scraper = CategoryScraper::new(fetcher.clone(), &test_config()).unwrap();
        let outcome = scraper.run(Category::Cars, 0, |_| {}).await;

        assert!(outcome.records.is_empty());
        assert!(fetcher.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_progress_fraction() {
        let p = PageProgress {
            page: 1,
            total: 4,
            records: 0,
            failed: false,
        };
        assert_eq!(p.fraction(), 0.25);
    }

    /// Answers every page URL after `latency`, recording when each request
    /// started.
    struct TimedFetcher {
        latency: Duration,
        starts: Mutex<Vec<Instant>>,
    }

    impl TimedFetcher {
        fn new(latency: Duration) -> Self {
            Self {
                latency,
                starts: Mutex::new(Vec::new()),
            }
        }

        /// Start times in milliseconds since `origin`, earliest first.
        fn start_offsets(&self, origin: Instant) -> Vec<u128> {
            let mut offsets: Vec<u128> = self
                .starts
                .lock()
                .unwrap()
                .iter()
                .map(|t| t.duration_since(origin).as_millis())
                .collect();
            offsets.sort_unstable();
            offsets
        }
    }

    #[async_trait]
    impl PageFetcher for TimedFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.starts.lock().unwrap().push(Instant::now());
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            let page_no = url.rsplit('=').next().unwrap_or_default();
            Ok(page(&[card(&format!("CAR{page_no}2020"), "1", &[], None)]))
        }
    }

    fn paced_config(delay_ms: u64, concurrency: usize) -> Config {
        let mut config = Config::default();
        config.crawler.request_delay_ms = delay_ms;
        config.crawler.max_concurrent = concurrency;
        config
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_pages_not_after_last() {
        let fetcher = Arc::new(TimedFetcher::new(Duration::ZERO));
        let scraper = CategoryScraper::new(fetcher.clone(), &paced_config(100, 1)).unwrap();

        let origin = Instant::now();
        let outcome = scraper.run(Category::Cars, 3, |_| {}).await;

        assert_eq!(outcome.records.len(), 3);
        assert_eq!(fetcher.start_offsets(origin), vec![0, 100, 200]);
        // No trailing wait once the last page is in.
        assert!(origin.elapsed() < Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_delay_follows_slow_responses() {
        let fetcher = Arc::new(TimedFetcher::new(Duration::from_millis(20)));
        let scraper = CategoryScraper::new(fetcher.clone(), &paced_config(100, 1)).unwrap();

        let origin = Instant::now();
        scraper.run(Category::Cars, 3, |_| {}).await;

        assert_eq!(fetcher.start_offsets(origin), vec![0, 120, 240]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_requests_keep_spacing() {
        let fetcher = Arc::new(TimedFetcher::new(Duration::from_millis(20)));
        let scraper = CategoryScraper::new(fetcher.clone(), &paced_config(100, 3)).unwrap();

        let origin = Instant::now();
        let outcome = scraper.run(Category::Cars, 4, |_| {}).await;

        let starts = fetcher.start_offsets(origin);
        assert_eq!(starts.len(), 4);
        assert!(
            starts.windows(2).all(|pair| pair[1] - pair[0] >= 100),
            "request starts too close together: {starts:?}"
        );

        let brands: Vec<_> = outcome.records.iter().map(|r| r.brand.as_str()).collect();
        assert_eq!(brands, ["CAR1", "CAR2", "CAR3", "CAR4"]);
    }
}
