//! Relative path templates for the backend's dataset layout.

use cyd_core::selection::Crop;

/// Per-selection prediction results, e.g.
/// `result_corn/bnn/result2021_284.csv`.
pub fn prediction_csv(crop: Crop, year: i32, day: &str) -> String {
    format!("result_{}/bnn/result{}_{}.csv", crop.as_str(), year, day)
}

/// Primary location of the averaged prediction series.
pub fn averaged_primary(crop: Crop, year: i32) -> String {
    format!("result_{}/bnn/average/avg{}.csv", crop.as_str(), year)
}

/// Static mirror of the averaged prediction series, tried when the
/// primary location fails.
pub fn averaged_secondary(crop: Crop, year: i32) -> String {
    format!("static/{}/avg{}.csv", crop.as_str(), year)
}

/// Historical county yield series for a crop.
pub fn historical_yield(crop: Crop) -> String {
    format!("historical/{}_yield.csv", crop.as_str())
}

/// County name/state/code reference table.
pub fn county_reference() -> String {
    "counties/county_state.csv".to_string()
}

/// County centroid geocode table (JSON).
pub fn county_geocode() -> String {
    "counties/county_geocode.json".to_string()
}

/// Multi-year prediction aggregate for a crop.
pub fn multi_year(crop: Crop) -> String {
    format!("result_{}/bnn/multi_year.csv", crop.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_path_matches_backend_layout() {
        assert_eq!(
            prediction_csv(Crop::Corn, 2021, "284"),
            "result_corn/bnn/result2021_284.csv"
        );
    }

    #[test]
    fn soybean_paths_use_crop_identifier() {
        assert_eq!(
            averaged_primary(Crop::Soybean, 2022),
            "result_soybean/bnn/average/avg2022.csv"
        );
        assert_eq!(historical_yield(Crop::Soybean), "historical/soybean_yield.csv");
    }
}
