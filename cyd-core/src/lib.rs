//! Core types and tabular decoding for county-level crop yield data.
//!
//! This crate owns the typed record layer shared by the rest of the
//! workspace: the current selection model (crop, year, day-of-year,
//! mapped property), prediction and historical yield records decoded
//! from CSV, county reference and geocode tables, the fetch error
//! taxonomy, and the static basemap registry.

pub mod basemap;
pub mod decode;
pub mod error;
pub mod records;
pub mod selection;
