//! Listing data structures.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::models::Category;

/// Fields pulled out of one listing block, before normalization.
///
/// `None` marks an absent element. Category-specific properties are only
/// filled for categories where they exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListing {
    /// Title without its trailing four characters
    pub brand: String,

    /// Last four characters of the title
    pub year: String,

    /// Price text ("0" when the price element is missing)
    pub price: String,

    pub address: Option<String>,
    pub mileage: Option<String>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,

    /// Owner name with the label prefix already removed
    pub owner: Option<String>,
}

/// Category-specific part of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleDetails {
    Car {
        mileage: Option<u64>,
        transmission: Option<String>,
        fuel_type: Option<String>,
    },
    Motorcycle {
        mileage: Option<u64>,
    },
    Rental,
}

impl VehicleDetails {
    pub fn category(&self) -> Category {
        match self {
            VehicleDetails::Car { .. } => Category::Cars,
            VehicleDetails::Motorcycle { .. } => Category::Motorcycles,
            VehicleDetails::Rental => Category::RentalVehicles,
        }
    }
}

/// A normalized vehicle listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    pub brand: String,
    pub year: Option<u32>,
    pub price: Option<u64>,
    pub address: String,
    pub details: VehicleDetails,
    pub owner: String,
}

impl ListingRecord {
    pub fn category(&self) -> Category {
        self.details.category()
    }

    pub fn mileage(&self) -> Option<u64> {
        match &self.details {
            VehicleDetails::Car { mileage, .. } | VehicleDetails::Motorcycle { mileage } => {
                *mileage
            }
            VehicleDetails::Rental => None,
        }
    }
}

// Flat layout: keys that do not apply to the category are left out
// entirely rather than written as null.
impl Serialize for ListingRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("brand", &self.brand)?;
        map.serialize_entry("year", &self.year)?;
        map.serialize_entry("price", &self.price)?;
        map.serialize_entry("address", &self.address)?;
        match &self.details {
            VehicleDetails::Car {
                mileage,
                transmission,
                fuel_type,
            } => {
                map.serialize_entry("mileage", mileage)?;
                map.serialize_entry("transmission", transmission)?;
                map.serialize_entry("fuel_type", fuel_type)?;
            }
            VehicleDetails::Motorcycle { mileage } => {
                map.serialize_entry("mileage", mileage)?;
            }
            VehicleDetails::Rental => {}
        }
        map.serialize_entry("owner", &self.owner)?;
        map.end()
    }
}
