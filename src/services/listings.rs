// src/services/listings.rs

//! Listing extraction.
//!
//! Pulls raw field-sets out of one listing page, one per advertisement
//! block, in document order.

use scraper::{ElementRef, Html, Selector};

use crate::error::{ListingError, Result};
use crate::models::{Category, PropertyField, RawListing, SelectorConfig};
use crate::services::normalize::{split_title, strip_owner_prefix};
use crate::services::parse_selector;

/// Price text used when a listing shows no price.
const MISSING_PRICE: &str = "0";

/// Listings found on one page.
#[derive(Debug, Default)]
pub struct PageExtract {
    pub listings: Vec<RawListing>,
    /// Blocks dropped because they were malformed
    pub skipped: usize,
}

/// Compiled selectors for listing blocks.
#[derive(Debug, Clone)]
pub struct ListingExtractor {
    listing: Selector,
    title: Selector,
    price: Selector,
    address: Selector,
    properties: Selector,
    property_item: Selector,
    author: Selector,
    owner: Selector,
    owner_link: Selector,
}

impl ListingExtractor {
    /// Compile the listing selectors from configuration.
    pub fn new(selectors: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            listing: parse_selector(&selectors.listing)?,
            title: parse_selector(&selectors.title)?,
            price: parse_selector(&selectors.price)?,
            address: parse_selector(&selectors.address)?,
            properties: parse_selector(&selectors.properties)?,
            property_item: parse_selector(&selectors.property_item)?,
            author: parse_selector(&selectors.author)?,
            owner: parse_selector(&selectors.owner)?,
            owner_link: parse_selector(&selectors.owner_link)?,
        })
    }

    /// Extract every well-formed listing block of `html`.
    pub fn extract(&self, html: &str, category: Category) -> PageExtract {
        let document = Html::parse_document(html);
        let mut page = PageExtract::default();

        for (index, block) in document.select(&self.listing).enumerate() {
            match self.parse_block(&block, category) {
                Ok(listing) => page.listings.push(listing),
                Err(reason) => {
                    page.skipped += 1;
                    log::debug!("Skipping listing block #{}: {}", index + 1, reason);
                }
            }
        }
        page
    }

    fn parse_block(
        &self,
        block: &ElementRef,
        category: Category,
    ) -> std::result::Result<RawListing, ListingError> {
        let title_elem = block
            .select(&self.title)
            .next()
            .ok_or(ListingError::MissingTitle)?;
        let title = element_text(&title_elem);
        if title.is_empty() {
            return Err(ListingError::EmptyTitle);
        }
        let (brand, year) = split_title(&title);

        let price = self
            .first_text(block, &self.price)
            .unwrap_or_else(|| MISSING_PRICE.to_string());
        let address = self.first_text(block, &self.address);

        let properties: Vec<String> = block
            .select(&self.properties)
            .next()
            .map(|props| {
                props
                    .select(&self.property_item)
                    .map(|li| element_text(&li))
                    .collect()
            })
            .unwrap_or_default();
        let property = |field| {
            category
                .property_index(field)
                .and_then(|idx| properties.get(idx))
                .cloned()
        };

        Ok(RawListing {
            brand: brand.to_string(),
            year: year.to_string(),
            price,
            address,
            mileage: property(PropertyField::Mileage),
            transmission: property(PropertyField::Transmission),
            fuel_type: property(PropertyField::FuelType),
            owner: self.owner_name(block),
        })
    }

    fn first_text(&self, block: &ElementRef, selector: &Selector) -> Option<String> {
        block.select(selector).next().map(|el| element_text(&el))
    }

    /// Author block → first owner paragraph → its link text, minus the label.
    fn owner_name(&self, block: &ElementRef) -> Option<String> {
        let author = block.select(&self.author).next()?;
        let owner = author.select(&self.owner).next()?;
        let link = owner.select(&self.owner_link).next()?;
        let text: String = link.text().collect();
        Some(strip_owner_prefix(&text))
    }
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
