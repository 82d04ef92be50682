//! Application configuration structures.

use std::fs;
use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Target site settings
    #[serde(default)]
    pub site: SiteConfig,

    /// CSS selectors describing the site's markup
    #[serde(default)]
    pub selectors: SelectorConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        let base = self.site.base_url()?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "site.base_url must be http(s), got {}",
                base.scheme()
            )));
        }
        for (name, selector) in self.selectors.entries() {
            Selector::parse(selector).map_err(|e| {
                AppError::selector(selector, format!("selectors.{name}: {e:?}"))
            })?;
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between page requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum pages fetched at once (1 = strictly sequential)
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Target site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Root URL that category paths are joined onto
    #[serde(default = "defaults::base_url")]
    pub base_url: String,
}

impl SiteConfig {
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
        }
    }
}

/// CSS selectors for listing pages and the pagination control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// One advertisement block
    #[serde(default = "defaults::listing")]
    pub listing: String,

    #[serde(default = "defaults::title")]
    pub title: String,

    #[serde(default = "defaults::price")]
    pub price: String,

    #[serde(default = "defaults::address")]
    pub address: String,

    /// Container of the property list
    #[serde(default = "defaults::properties")]
    pub properties: String,

    /// Items inside the property container
    #[serde(default = "defaults::property_item")]
    pub property_item: String,

    /// Author block
    #[serde(default = "defaults::author")]
    pub author: String,

    /// Element inside the author block holding the owner link
    #[serde(default = "defaults::owner")]
    pub owner: String,

    #[serde(default = "defaults::owner_link")]
    pub owner_link: String,

    /// Pagination region on the landing page
    #[serde(default = "defaults::paginator")]
    pub paginator: String,

    #[serde(default = "defaults::page_list")]
    pub page_list: String,

    #[serde(default = "defaults::page_item")]
    pub page_item: String,

    #[serde(default = "defaults::page_link")]
    pub page_link: String,
}

impl SelectorConfig {
    /// All selectors with their config key, for validation.
    pub fn entries(&self) -> [(&'static str, &str); 13] {
        [
            ("listing", self.listing.as_str()),
            ("title", self.title.as_str()),
            ("price", self.price.as_str()),
            ("address", self.address.as_str()),
            ("properties", self.properties.as_str()),
            ("property_item", self.property_item.as_str()),
            ("author", self.author.as_str()),
            ("owner", self.owner.as_str()),
            ("owner_link", self.owner_link.as_str()),
            ("paginator", self.paginator.as_str()),
            ("page_list", self.page_list.as_str()),
            ("page_item", self.page_item.as_str()),
            ("page_link", self.page_link.as_str()),
        ]
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing: defaults::listing(),
            title: defaults::title(),
            price: defaults::price(),
            address: defaults::address(),
            properties: defaults::properties(),
            property_item: defaults::property_item(),
            author: defaults::author(),
            owner: defaults::owner(),
            owner_link: defaults::owner_link(),
            paginator: defaults::paginator(),
            page_list: defaults::page_list(),
            page_item: defaults::page_item(),
            page_link: defaults::page_link(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn request_delay() -> u64 {
        100
    }
    pub fn max_concurrent() -> usize {
        1
    }

    // Site defaults
    pub fn base_url() -> String {
        "https://dakar-auto.com".into()
    }

    // Listing page markup
    pub fn listing() -> String {
        "div.listings-cards__list-item".into()
    }
    pub fn title() -> String {
        "h2.listing-card__header__title".into()
    }
    pub fn price() -> String {
        "h3.listing-card__header__price".into()
    }
    pub fn address() -> String {
        "span.province".into()
    }
    pub fn properties() -> String {
        "div.listing-card__properties".into()
    }
    pub fn property_item() -> String {
        "li".into()
    }
    pub fn author() -> String {
        "div.author-meta".into()
    }
    pub fn owner() -> String {
        "p.time-author".into()
    }
    pub fn owner_link() -> String {
        "a".into()
    }

    // Pagination markup
    pub fn paginator() -> String {
        "nav.paginator".into()
    }
    pub fn page_list() -> String {
        "ul".into()
    }
    pub fn page_item() -> String {
        "li".into()
    }
    pub fn page_link() -> String {
        "a[href]".into()
    }
}
