// src/lib.rs

//! Vehicle listing crawler library
//!
//! Scrapes the car, motorcycle and rental categories of dakar-auto.com and
//! normalizes every listing into a [`models::ListingRecord`].

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
