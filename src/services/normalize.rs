// src/services/normalize.rs

//! Field normalization.
//!
//! Turns raw listing text into typed values. Every function here is total:
//! unparseable input maps to `None` for numbers and to [`UNKNOWN`] for text.

use crate::models::{Category, ListingRecord, RawListing, VehicleDetails};

/// Text sentinel for a missing or blank value.
pub const UNKNOWN: &str = "UNKNOWN";

/// Placeholder the site (and older exports) use for missing values.
const NOT_AVAILABLE: &str = "N/A";

/// Width of the year suffix at the end of a listing title.
const TITLE_YEAR_WIDTH: usize = 4;

/// Width of the label (e.g. "par ") in front of the owner name.
const OWNER_PREFIX_WIDTH: usize = 4;

fn present(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.is_empty() && *s != NOT_AVAILABLE)
}

/// Keep only the digits of `raw` and parse them.
///
/// ```
/// use vehicle_crawler::services::normalize::clean_numeric;
///
/// assert_eq!(clean_numeric(Some("12 345 FCFA")), Some(12345));
/// assert_eq!(clean_numeric(Some("N/A")), None);
/// ```
pub fn clean_numeric(raw: Option<&str>) -> Option<u64> {
    let raw = present(raw)?;
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    // Overflowing digit runs are treated like garbage.
    digits.parse().ok()
}

/// Trim and uppercase `raw`, or [`UNKNOWN`] when there is nothing to keep.
pub fn clean_text(raw: Option<&str>) -> String {
    match present(raw).map(str::trim) {
        Some(text) if !text.is_empty() => text.to_uppercase(),
        _ => UNKNOWN.to_string(),
    }
}

/// Split a listing title into its brand/model part and its year part.
///
/// The site renders titles as `<brand model><year>` with no separator, so
/// the year is taken positionally as the last four characters. Titles of
/// four characters or fewer have no brand part.
pub fn split_title(title: &str) -> (&str, &str) {
    let cut = title
        .char_indices()
        .rev()
        .nth(TITLE_YEAR_WIDTH - 1)
        .map_or(0, |(idx, _)| idx);
    title.split_at(cut)
}

/// Remove the fixed-width label in front of the owner name.
pub fn strip_owner_prefix(text: &str) -> String {
    text.chars()
        .skip(OWNER_PREFIX_WIDTH)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Normalize one raw listing into a record for `category`.
///
/// The category alone decides which vehicle properties the record carries.
pub fn normalize(raw: &RawListing, category: Category) -> ListingRecord {
    let details = match category {
        Category::Cars => VehicleDetails::Car {
            mileage: clean_numeric(raw.mileage.as_deref()),
            transmission: raw.transmission.as_deref().map(|t| clean_text(Some(t))),
            fuel_type: raw.fuel_type.as_deref().map(|t| clean_text(Some(t))),
        },
        Category::Motorcycles => VehicleDetails::Motorcycle {
            mileage: clean_numeric(raw.mileage.as_deref()),
        },
        Category::RentalVehicles => VehicleDetails::Rental,
    };

    ListingRecord {
        brand: clean_text(Some(raw.brand.as_str())),
        year: clean_numeric(Some(raw.year.as_str())).and_then(|y| u32::try_from(y).ok()),
        price: clean_numeric(Some(raw.price.as_str())),
        address: clean_text(raw.address.as_deref()),
        details,
        owner: clean_text(raw.owner.as_deref()),
    }
}
