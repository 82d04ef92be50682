// src/pipeline/scrape.rs

//! Category scraping pipeline.

use std::sync::Arc;

use chrono::Utc;

use crate::error::Result;
use crate::models::{Category, Config, ScrapeStats};
use crate::pipeline::ScrapeSummary;
use crate::services::{CategoryScraper, PageCounter, ScrapeOutcome};
use crate::utils::console;
use crate::utils::http::{HttpFetcher, PageFetcher};

/// How many pages the caller wants scraped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// The first `n` pages, capped at the discovered page count
    First(u32),
    /// Every discovered page
    All,
}

impl PageRequest {
    /// Number of pages to scrape given the discovered maximum.
    pub fn clamp(self, max_pages: u32) -> u32 {
        let max_pages = max_pages.max(1);
        match self {
            PageRequest::First(n) => n.clamp(1, max_pages),
            PageRequest::All => max_pages,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::First(1)
    }
}

/// Everything produced by one scrape run.
#[derive(Debug)]
pub struct ScrapeReport {
    pub category: Category,
    /// Page count discovered on the landing page
    pub max_pages: u32,
    pub pages_scraped: u32,
    pub outcome: ScrapeOutcome,
    pub stats: ScrapeStats,
    pub summary: ScrapeSummary,
}

/// Discover the page count of `category` over HTTP.
pub async fn discover_pages(config: &Config, category: Category) -> Result<u32> {
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config.crawler)?);
    discover_pages_with(fetcher, config, category).await
}

/// Discover the page count of `category` using `fetcher`.
pub async fn discover_pages_with(
    fetcher: Arc<dyn PageFetcher>,
    config: &Config,
    category: Category,
) -> Result<u32> {
    let landing = category.landing_url(&config.site.base_url()?)?;
    let counter = PageCounter::new(fetcher, &config.selectors)?;
    Ok(counter.resolve(landing.as_str()).await)
}

/// Run a scrape of `category` over HTTP.
pub async fn run_scrape(
    config: &Config,
    category: Category,
    request: PageRequest,
) -> Result<ScrapeReport> {
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config.crawler)?);
    run_scrape_with(fetcher, config, category, request).await
}

/// Run a scrape of `category` using `fetcher`.
///
/// Only setup problems (bad selectors, bad base URL) are errors; network
/// and markup failures during the run shrink the result instead.
pub async fn run_scrape_with(
    fetcher: Arc<dyn PageFetcher>,
    config: &Config,
    category: Category,
    request: PageRequest,
) -> Result<ScrapeReport> {
    let start_time = Utc::now();
    console::header(&format!("Scraping {}", category.label()));

    console::step(1, 2, "Discovering page count");
    let max_pages = discover_pages_with(Arc::clone(&fetcher), config, category).await?;
    let pages = request.clamp(max_pages);
    console::sub_item(&format!("{max_pages} pages available, scraping {pages}"));

    console::step(2, 2, "Fetching listings");
    let scraper = CategoryScraper::new(fetcher, config)?;
    let outcome = scraper
        .run(category, pages, |p| {
            let detail = if p.failed {
                "failed".to_string()
            } else {
                format!("{} listings", p.records)
            };
            console::progress(p.page, p.total, &detail);
        })
        .await;

    let stats = ScrapeStats {
        start_time,
        end_time: Utc::now(),
        record_count: outcome.records.len(),
        pages_failed: outcome.pages_failed,
        listings_skipped: outcome.listings_skipped,
    };
    let summary = ScrapeSummary::from_records(&outcome.records);

    log::info!(
        "Scraped {} {} listings from {} pages in {:.1}s",
        stats.record_count,
        category,
        pages,
        stats.elapsed_secs()
    );
    if stats.pages_failed > 0 {
        log::warn!("{} of {} pages failed", stats.pages_failed, pages);
    }

    Ok(ScrapeReport {
        category,
        max_pages,
        pages_scraped: pages,
        outcome,
        stats,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::listings::tests::{card, page};
    use crate::services::scrape::tests::{FixtureFetcher, test_config};

    const LANDING: &str = r#"<nav class="paginator"><ul>
        <li><a href="/senegal/voitures-4?&page=1">1</a></li>
        <li><a href="/senegal/voitures-4?&page=3">3</a></li>
    </ul></nav>"#;

    #[test]
    fn test_page_request_clamp() {
        assert_eq!(PageRequest::First(5).clamp(3), 3);
        assert_eq!(PageRequest::First(0).clamp(3), 1);
        assert_eq!(PageRequest::First(2).clamp(3), 2);
        assert_eq!(PageRequest::All.clamp(7), 7);
        assert_eq!(PageRequest::All.clamp(0), 1);
        assert_eq!(PageRequest::default(), PageRequest::First(1));
    }

    #[tokio::test]
    async fn test_run_scrape_clamps_to_discovered_pages() {
        let fetcher = Arc::new(
            FixtureFetcher::default()
                .with("https://dakar-auto.com/senegal/voitures-4", LANDING.to_string())
                .with(
                    "https://dakar-auto.com/senegal/voitures-4?&page=1",
                    page(&[card("TOYOTA RAV42016", "9 000 000", &[], None)]),
                )
                .with(
                    "https://dakar-auto.com/senegal/voitures-4?&page=3",
                    page(&[card("KIA PICANTO2020", "5 000 000", &[], None)]),
                ),
        );

        let report = run_scrape_with(
            fetcher.clone(),
            &test_config(),
            Category::Cars,
            PageRequest::First(10),
        )
        .await
        .unwrap();

        assert_eq!(report.max_pages, 3);
        assert_eq!(report.pages_scraped, 3);
        assert_eq!(report.stats.record_count, 2);
        assert_eq!(report.stats.pages_failed, 1);
        assert_eq!(report.summary.max_price, Some(9_000_000));
        assert_eq!(report.summary.mean_price, Some(7_000_000));
        // landing + three pages, each fetched once
        assert_eq!(fetcher.requests.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_run_scrape_without_landing_page_scrapes_one() {
        let fetcher = Arc::new(FixtureFetcher::default());
        let report = run_scrape_with(
            fetcher,
            &test_config(),
            Category::RentalVehicles,
            PageRequest::All,
        )
        .await
        .unwrap();

        assert_eq!(report.max_pages, 1);
        assert_eq!(report.pages_scraped, 1);
        assert!(report.outcome.records.is_empty());
        assert_eq!(report.outcome.pages_failed, 1);
    }

    #[tokio::test]
    async fn test_run_scrape_rejects_bad_selector() {
        let mut config = test_config();
        config.selectors.title = "[[".to_string();
        let result = run_scrape_with(
            Arc::new(FixtureFetcher::default()),
            &config,
            Category::Cars,
            PageRequest::All,
        )
        .await;
        assert!(result.is_err());
    }
}
