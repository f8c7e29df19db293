//! Per-dataset load functions: fetch a body, decode it, report the
//! batch diagnostics.
//!
//! Loaders return `Result`; converting a failure into an empty dataset
//! commit (and deciding on fallbacks) is the orchestrator's policy.

use crate::paths;
use crate::source::DataSource;
use cyd_core::error::FetchError;
use cyd_core::records::{
    geocode_from_json, Coordinates, CountyReference, HistoricalRecord, PredictionRecord,
};
use cyd_core::selection::Crop;
use std::collections::HashMap;

/// Fetch and decode a prediction record CSV at an explicit path.
pub async fn predictions_at<S: DataSource>(
    source: &S,
    path: &str,
) -> Result<Vec<PredictionRecord>, FetchError> {
    let body = source.get_text(path).await?;
    let (records, stats) = PredictionRecord::from_csv(&body);
    if stats.invalid_values > 0 {
        log::warn!("{}: {} invalid values in {} rows", path, stats.invalid_values, stats.rows);
    }
    Ok(records)
}

/// Prediction results for one (crop, year, day) selection.
pub async fn load_predictions<S: DataSource>(
    source: &S,
    crop: Crop,
    year: i32,
    day: &str,
) -> Result<Vec<PredictionRecord>, FetchError> {
    predictions_at(source, &paths::prediction_csv(crop, year, day)).await
}

/// Historical county yield series for a crop.
pub async fn load_historical<S: DataSource>(
    source: &S,
    crop: Crop,
) -> Result<Vec<HistoricalRecord>, FetchError> {
    let path = paths::historical_yield(crop);
    let body = source.get_text(&path).await?;
    let (records, stats) = HistoricalRecord::from_csv(&body);
    if stats.invalid_values > 0 {
        log::warn!("{}: {} invalid values in {} rows", path, stats.invalid_values, stats.rows);
    }
    Ok(records)
}

/// County reference table, grouped by county name.
pub async fn load_county_reference<S: DataSource>(
    source: &S,
) -> Result<HashMap<String, Vec<CountyReference>>, FetchError> {
    let path = paths::county_reference();
    let body = source.get_text(&path).await?;
    let (grouped, stats) = CountyReference::from_csv(&body);
    if stats.invalid_values > 0 {
        log::warn!("{}: {} invalid values in {} rows", path, stats.invalid_values, stats.rows);
    }
    Ok(grouped)
}

/// County centroid geocode table.
pub async fn load_county_geocode<S: DataSource>(
    source: &S,
) -> Result<HashMap<String, Coordinates>, FetchError> {
    let body = source.get_text(&paths::county_geocode()).await?;
    geocode_from_json(&body)
}

/// Multi-year prediction aggregate for a crop.
pub async fn load_multi_year<S: DataSource>(
    source: &S,
    crop: Crop,
) -> Result<Vec<PredictionRecord>, FetchError> {
    predictions_at(source, &paths::multi_year(crop)).await
}
