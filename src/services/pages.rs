// src/services/pages.rs

//! Page-count discovery.
//!
//! Reads the pagination control of a category landing page and returns the
//! highest page number it links to.

use std::sync::Arc;

use regex::Regex;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::SelectorConfig;
use crate::services::parse_selector;
use crate::utils::http::PageFetcher;

/// Compiled pagination selectors.
#[derive(Debug, Clone)]
struct PaginationSelectors {
    region: Selector,
    list: Selector,
    item: Selector,
    link: Selector,
}

/// Service resolving how many listing pages a category has.
pub struct PageCounter {
    fetcher: Arc<dyn PageFetcher>,
    selectors: PaginationSelectors,
    /// Tried in order: `page=<n>` query parameter, then `-<n>` path suffix
    href_patterns: [Regex; 2],
}

impl PageCounter {
    /// Create a page counter using the pagination selectors from `selectors`.
    pub fn new(fetcher: Arc<dyn PageFetcher>, selectors: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            fetcher,
            selectors: PaginationSelectors {
                region: parse_selector(&selectors.paginator)?,
                list: parse_selector(&selectors.page_list)?,
                item: parse_selector(&selectors.page_item)?,
                link: parse_selector(&selectors.page_link)?,
            },
            href_patterns: [compile(r"page=(\d+)")?, compile(r"-(\d+)$")?],
        })
    }

    /// Highest page number for the landing page at `url`.
    ///
    /// Never fails: fetch errors, a missing pagination control or an
    /// unrecognized link all resolve to a single page.
    pub async fn resolve(&self, url: &str) -> u32 {
        match self.try_resolve(url).await {
            Ok(Some(count)) => {
                log::debug!("{} has {} pages", url, count);
                count
            }
            Ok(None) => {
                log::debug!("No pagination found at {}; assuming one page", url);
                1
            }
            Err(error) => {
                log::warn!("Page count lookup failed for {}: {}", url, error);
                1
            }
        }
    }

    async fn try_resolve(&self, url: &str) -> Result<Option<u32>> {
        let html = self.fetcher.fetch(url).await?;
        Ok(self.parse_page_count(&html))
    }

    /// Extract the last page number from landing page markup.
    pub fn parse_page_count(&self, html: &str) -> Option<u32> {
        let document = Html::parse_document(html);
        let sel = &self.selectors;

        let region = document.select(&sel.region).next()?;
        let list = region.select(&sel.list).next()?;
        let last_item = list.select(&sel.item).last()?;
        let href = last_item
            .select(&sel.link)
            .next()
            .and_then(|link| link.value().attr("href"))?;

        self.page_number_from_href(href).map(|page| page.max(1))
    }

    /// Page number carried by a pagination link, if any.
    pub fn page_number_from_href(&self, href: &str) -> Option<u32> {
        self.href_patterns
            .iter()
            .find_map(|pattern| pattern.captures(href))
            .and_then(|caps| caps.get(1))
            .and_then(|digits| digits.as_str().parse().ok())
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| AppError::config(format!("bad pattern {pattern}: {e}")))
}
