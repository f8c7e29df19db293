//! Choropleth rendering settings, mutable only through explicit setters.

use cyd_core::selection::Property;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Value range, per-property color scales, layer opacities, and the
/// active basemap id.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ChoroplethSettings {
    value_range: (f64, f64),
    color_scales: HashMap<Property, Vec<String>>,
    fill_opacity: f64,
    line_opacity: f64,
    basemap_id: String,
}

fn scale(colors: &[&str]) -> Vec<String> {
    colors.iter().map(|c| (*c).to_string()).collect()
}

impl Default for ChoroplethSettings {
    fn default() -> Self {
        let mut color_scales = HashMap::new();
        // Sequential yellow-green for yield values, diverging red-blue
        // for signed error, sequential purples for uncertainty.
        color_scales.insert(
            Property::Pred,
            scale(&["#ffffcc", "#c2e699", "#78c679", "#31a354", "#006837"]),
        );
        color_scales.insert(
            Property::Yield,
            scale(&["#ffffcc", "#c2e699", "#78c679", "#31a354", "#006837"]),
        );
        color_scales.insert(
            Property::Error,
            scale(&["#ca0020", "#f4a582", "#f7f7f7", "#92c5de", "#0571b0"]),
        );
        color_scales.insert(
            Property::Uncertainty,
            scale(&["#f2f0f7", "#cbc9e2", "#9e9ac8", "#756bb1", "#54278f"]),
        );
        ChoroplethSettings {
            value_range: (0.0, 250.0),
            color_scales,
            fill_opacity: 0.7,
            line_opacity: 0.4,
            basemap_id: "osm".to_string(),
        }
    }
}

impl ChoroplethSettings {
    pub fn value_range(&self) -> (f64, f64) {
        self.value_range
    }

    /// Set the shaded value range; an inverted pair is reordered.
    pub fn set_value_range(&mut self, min: f64, max: f64) {
        self.value_range = if min <= max { (min, max) } else { (max, min) };
    }

    pub fn color_scale(&self, property: Property) -> Option<&[String]> {
        self.color_scales.get(&property).map(Vec::as_slice)
    }

    pub fn set_color_scale(&mut self, property: Property, colors: Vec<String>) {
        self.color_scales.insert(property, colors);
    }

    pub fn fill_opacity(&self) -> f64 {
        self.fill_opacity
    }

    pub fn set_fill_opacity(&mut self, opacity: f64) {
        self.fill_opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn line_opacity(&self) -> f64 {
        self.line_opacity
    }

    pub fn set_line_opacity(&mut self, opacity: f64) {
        self.line_opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn basemap_id(&self) -> &str {
        &self.basemap_id
    }

    pub fn set_basemap(&mut self, id: &str) {
        self.basemap_id = id.to_string();
    }
}
