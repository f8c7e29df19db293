//! Typed records for prediction results, historical yields, and county
//! reference tables, with tolerant CSV/JSON constructors.

use crate::decode::{coerce_f64, coerce_i32, decode_rows, round2, DecodeStats};
use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Normalize a county FIPS code to the canonical 5-character
/// zero-padded form, regardless of source width.
pub fn normalize_fips(raw: &str) -> String {
    format!("{:0>5}", raw.trim())
}

/// One county's model output for a (crop, year, day) selection.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// 5-character zero-padded county FIPS code.
    pub fips: String,
    /// Predicted yield (bu/acre), rounded to two decimals.
    pub pred: f64,
    /// Observed yield (bu/acre), rounded to two decimals.
    pub yield_value: f64,
    /// Model uncertainty, rounded to two decimals.
    pub uncertainty: f64,
    /// Signed prediction error: pred - observed.
    pub error: f64,
}

impl PredictionRecord {
    /// Decode a prediction result CSV body.
    ///
    /// Expected columns (with headers):
    /// `FIPS,y_test_pred,y_test,y_test_pred_uncertainty`
    ///
    /// Rows without a FIPS are skipped; numeric fields that fail to
    /// parse default to 0.0 and are counted in the batch stats.
    pub fn from_csv(text: &str) -> (Vec<PredictionRecord>, DecodeStats) {
        let (rows, mut stats) = decode_rows(text, true);
        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let fips = match row.get("FIPS") {
                Some(f) if !f.is_empty() => normalize_fips(f),
                _ => {
                    stats.invalid_values += 1;
                    continue;
                }
            };
            let mut field = |name: &str| -> f64 {
                match row.get(name).map(String::as_str).and_then(coerce_f64) {
                    Some(v) => round2(v),
                    None => {
                        stats.invalid_values += 1;
                        0.0
                    }
                }
            };
            let pred = field("y_test_pred");
            let yield_value = field("y_test");
            let uncertainty = field("y_test_pred_uncertainty");
            records.push(PredictionRecord {
                fips,
                pred,
                yield_value,
                uncertainty,
                error: round2(pred - yield_value),
            });
        }
        stats.rows = records.len();
        (records, stats)
    }

    /// The value shaded by the choropleth for a given property.
    pub fn value_for(&self, property: crate::selection::Property) -> f64 {
        use crate::selection::Property;
        match property {
            Property::Pred => self.pred,
            Property::Yield => self.yield_value,
            Property::Error => self.error,
            Property::Uncertainty => self.uncertainty,
        }
    }
}

/// One county-year observation from the historical yield series.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct HistoricalRecord {
    pub fips: String,
    pub year: i32,
    pub yield_value: f64,
}

impl HistoricalRecord {
    /// Decode a historical yield CSV body.
    ///
    /// Expected columns (with headers): `FIPS,year,yield`
    pub fn from_csv(text: &str) -> (Vec<HistoricalRecord>, DecodeStats) {
        let (rows, mut stats) = decode_rows(text, true);
        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let fips = match row.get("FIPS") {
                Some(f) if !f.is_empty() => normalize_fips(f),
                _ => {
                    stats.invalid_values += 1;
                    continue;
                }
            };
            let year = match row.get("year").map(String::as_str).and_then(coerce_i32) {
                Some(y) => y,
                None => {
                    stats.invalid_values += 1;
                    continue;
                }
            };
            let yield_value = match row.get("yield").map(String::as_str).and_then(coerce_f64) {
                Some(v) => round2(v),
                None => {
                    stats.invalid_values += 1;
                    0.0
                }
            };
            records.push(HistoricalRecord {
                fips,
                year,
                yield_value,
            });
        }
        stats.rows = records.len();
        (records, stats)
    }
}

/// County reference metadata: name plus state and county FIPS parts.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CountyReference {
    pub name: String,
    pub state_code: String,
    pub county_code: String,
}

impl CountyReference {
    /// The combined 5-character FIPS code for this county.
    pub fn fips(&self) -> String {
        format!("{:0>2}{:0>3}", self.state_code.trim(), self.county_code.trim())
    }

    /// Decode the county reference CSV and group entries by county
    /// name. A name may map to several counties in different states.
    ///
    /// Expected columns (with headers): `county,state_code,county_code`
    pub fn from_csv(text: &str) -> (HashMap<String, Vec<CountyReference>>, DecodeStats) {
        let (rows, mut stats) = decode_rows(text, true);
        let mut grouped: HashMap<String, Vec<CountyReference>> = HashMap::new();
        let mut count = 0;
        for row in &rows {
            let name = match row.get("county") {
                Some(n) if !n.is_empty() => n.clone(),
                _ => {
                    stats.invalid_values += 1;
                    continue;
                }
            };
            let state_code = row.get("state_code").cloned().unwrap_or_default();
            let county_code = row.get("county_code").cloned().unwrap_or_default();
            grouped.entry(name.clone()).or_default().push(CountyReference {
                name,
                state_code,
                county_code,
            });
            count += 1;
        }
        stats.rows = count;
        (grouped, stats)
    }
}

/// Latitude/longitude for a county centroid.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Decode the county geocode JSON body: an object mapping FIPS to
/// coordinates. FIPS keys are normalized to 5 characters.
pub fn geocode_from_json(text: &str) -> Result<HashMap<String, Coordinates>, FetchError> {
    let raw: HashMap<String, Coordinates> =
        serde_json::from_str(text).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(raw
        .into_iter()
        .map(|(fips, coords)| (normalize_fips(&fips), coords))
        .collect())
}
