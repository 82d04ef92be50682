// src/models/category.rs

//! Listing categories and their per-category schema.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{AppError, Result};

/// Optional vehicle property read from a listing's property list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyField {
    Mileage,
    Transmission,
    FuelType,
}

/// One of the three listing verticals of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Cars,
    Motorcycles,
    RentalVehicles,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Cars,
        Category::Motorcycles,
        Category::RentalVehicles,
    ];

    /// Name used on the command line and in log messages.
    pub fn name(self) -> &'static str {
        match self {
            Category::Cars => "cars",
            Category::Motorcycles => "motorcycles",
            Category::RentalVehicles => "rentals",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Category::Cars => "Cars",
            Category::Motorcycles => "Motorcycles & Scooters",
            Category::RentalVehicles => "Car Rentals",
        }
    }

    /// Path of the category landing page, relative to the site base URL.
    pub fn path(self) -> &'static str {
        match self {
            Category::Cars => "senegal/voitures-4",
            Category::Motorcycles => "senegal/motos-and-scooters-3",
            Category::RentalVehicles => "senegal/location-de-voitures-19",
        }
    }

    /// Position of `field` in the listing's property list, if the field
    /// exists for this category at all.
    pub fn property_index(self, field: PropertyField) -> Option<usize> {
        match (self, field) {
            (Category::Cars | Category::Motorcycles, PropertyField::Mileage) => Some(1),
            (Category::Cars, PropertyField::Transmission) => Some(2),
            (Category::Cars, PropertyField::FuelType) => Some(3),
            _ => None,
        }
    }

    /// Landing page URL, used for page-count discovery.
    ///
    /// A path prefix on `base` is kept, with or without a trailing slash.
    pub fn landing_url(self, base: &Url) -> Result<Url> {
        if base.path().ends_with('/') {
            return Ok(base.join(self.path())?);
        }
        let mut dir = base.clone();
        dir.set_path(&format!("{}/", base.path()));
        Ok(dir.join(self.path())?)
    }

    /// URL of a given listing page (1-based).
    pub fn page_url(self, base: &Url, page: u32) -> Result<String> {
        Ok(format!("{}?&page={}", self.landing_url(base)?, page))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cars" | "car" | "voitures" => Ok(Category::Cars),
            "motorcycles" | "motorcycle" | "motos" => Ok(Category::Motorcycles),
            "rentals" | "rental" | "location" => Ok(Category::RentalVehicles),
            other => Err(AppError::InvalidCategory(other.to_string())),
        }
    }
}
