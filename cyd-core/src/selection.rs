//! The current map selection: crop, year, day-of-year, mapped property.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default day-of-year shown on first load (mid-October, end of season).
pub const DEFAULT_DAY: &str = "284";

/// Crops covered by the prediction model.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crop {
    Corn,
    Soybean,
}

impl Crop {
    /// Lowercase identifier used in dataset paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Crop::Corn => "corn",
            Crop::Soybean => "soybean",
        }
    }

    /// Display label for titles.
    pub fn label(&self) -> &'static str {
        match self {
            Crop::Corn => "Corn",
            Crop::Soybean => "Soybean",
        }
    }

    /// The default season year for this crop. The soybean runs start a
    /// season later than corn, so the defaults differ.
    pub fn default_year(&self) -> i32 {
        match self {
            Crop::Corn => 2021,
            Crop::Soybean => 2022,
        }
    }
}

/// The mapped property: which per-county value the choropleth shades by.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Property {
    Pred,
    Yield,
    Error,
    Uncertainty,
}

impl Property {
    pub fn as_str(&self) -> &'static str {
        match self {
            Property::Pred => "pred",
            Property::Yield => "yield",
            Property::Error => "error",
            Property::Uncertainty => "uncertainty",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Property::Pred => "Predicted Yield",
            Property::Yield => "Observed Yield",
            Property::Error => "Prediction Error",
            Property::Uncertainty => "Uncertainty",
        }
    }
}

/// The (crop, year, day, property) tuple that parameterizes most fetches.
///
/// Invariant: `(Soybean, Error)` is not a valid combination; mutation
/// entry points in the state store clamp it to `Pred`.
#[derive(Debug, PartialEq, Eq, Clone, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub crop: Crop,
    pub year: i32,
    /// Zero-padded 3-digit day-of-year, e.g. "284".
    pub day: String,
    pub property: Property,
}

impl Default for Selection {
    fn default() -> Self {
        Selection {
            crop: Crop::Corn,
            year: Crop::Corn.default_year(),
            day: DEFAULT_DAY.to_string(),
            property: Property::Pred,
        }
    }
}

impl Selection {
    /// The (crop, year, day) key that parameterizes fetches; excludes
    /// the property, which only affects rendering.
    pub fn key(&self) -> (Crop, i32, String) {
        (self.crop, self.year, self.day.clone())
    }
}

/// Zero-pad a day-of-year to the canonical 3-digit form.
pub fn pad_day(day: &str) -> String {
    format!("{:0>3}", day.trim())
}

/// In-season day-of-year checkpoints and their display labels.
const SEASON_LABELS: &[(&str, &str)] = &[
    ("140", "mid-May"),
    ("156", "early June"),
    ("172", "mid-June"),
    ("188", "early July"),
    ("204", "mid-July"),
    ("220", "early August"),
    ("236", "mid-August"),
    ("252", "early September"),
    ("268", "mid-September"),
    ("284", "mid-October"),
];

/// Season label for a day-of-year. Days off the checkpoint grid fall
/// back to the calendar date for that year.
pub fn season_label(year: i32, day: &str) -> String {
    let padded = pad_day(day);
    for (d, label) in SEASON_LABELS {
        if *d == padded {
            return (*label).to_string();
        }
    }
    match padded
        .parse::<u32>()
        .ok()
        .and_then(|ordinal| NaiveDate::from_yo_opt(year, ordinal))
    {
        Some(date) => date.format("%b %d").to_string(),
        None => padded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_defaults_are_distinct() {
        assert_ne!(Crop::Corn.default_year(), Crop::Soybean.default_year());
    }

    #[test]
    fn pad_day_normalizes_width() {
        assert_eq!(pad_day("9"), "009");
        assert_eq!(pad_day("84"), "084");
        assert_eq!(pad_day("284"), "284");
    }

    #[test]
    fn season_label_uses_checkpoint_table() {
        assert_eq!(season_label(2021, "284"), "mid-October");
        assert_eq!(season_label(2021, "140"), "mid-May");
    }

    #[test]
    fn season_label_falls_back_to_calendar_date() {
        // Day 1 of 2021 is January 1st.
        assert_eq!(season_label(2021, "1"), "Jan 01");
    }

    #[test]
    fn default_selection_is_corn_prediction() {
        let sel = Selection::default();
        assert_eq!(sel.crop, Crop::Corn);
        assert_eq!(sel.year, 2021);
        assert_eq!(sel.day, "284");
        assert_eq!(sel.property, Property::Pred);
    }
}
