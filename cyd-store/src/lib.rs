//! Process-wide application state for the yield dashboard.
//!
//! [`AppState`] is the sole owner of the current selection, all loaded
//! datasets, the keyed cache, and UI-adjacent derived state (selected
//! counties, drawn regions, queued jobs). The orchestrator is the only
//! writer; the rendering layer reads snapshots and calls the mutation
//! entry points below, never the fields directly.
//!
//! [`StateHandle`] wraps the state in `Rc<RefCell<_>>` for cheap
//! sharing across a single-threaded cooperative runtime, the same way
//! the persistence layer shares its connection.

pub mod cache;
pub mod choropleth;
pub mod counties;
pub mod jobs;

use crate::cache::{CacheKey, KeyedCache};
use crate::choropleth::ChoroplethSettings;
use crate::counties::SelectedCounties;
use cyd_core::basemap;
use cyd_core::records::{Coordinates, CountyReference, HistoricalRecord, PredictionRecord};
use cyd_core::selection::{season_label, Crop, Property, Selection};
use crate::jobs::QueuedJob;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

/// A user-drawn polygon over the map, as [lat, lng] vertices.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct DrawnRegion {
    pub vertices: Vec<[f64; 2]>,
}

/// The process-wide state store.
#[derive(Debug, Default)]
pub struct AppState {
    selection: Selection,
    predictions: Vec<PredictionRecord>,
    historical: Vec<HistoricalRecord>,
    averaged: Vec<PredictionRecord>,
    multi_year: Vec<PredictionRecord>,
    county_reference: HashMap<String, Vec<CountyReference>>,
    county_geocode: HashMap<String, Coordinates>,
    cache: KeyedCache,
    choropleth: ChoroplethSettings,
    selected_counties: SelectedCounties,
    drawn_regions: Vec<DrawnRegion>,
    jobs: Vec<QueuedJob>,
}

impl AppState {
    pub fn new() -> Self {
        AppState::default()
    }

    // Selection ----------------------------------------------------------

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Set the current crop.
    ///
    /// Switching to soybean forces the soybean default year and, when
    /// the mapped property was `Error` (not produced for soybean runs),
    /// remaps it to `Pred`. Switching to corn alters neither.
    pub fn set_crop(&mut self, crop: Crop) {
        self.selection.crop = crop;
        if crop == Crop::Soybean {
            self.selection.year = crop.default_year();
            if self.selection.property == Property::Error {
                log::info!("property 'error' unavailable for soybean, remapping to 'pred'");
                self.selection.property = Property::Pred;
            }
        }
    }

    pub fn set_year(&mut self, year: i32) {
        self.selection.year = year;
    }

    /// Set the day-of-year, normalizing to the 3-digit form.
    pub fn set_day(&mut self, day: &str) {
        self.selection.day = cyd_core::selection::pad_day(day);
    }

    /// Set the mapped property, clamping the soybean/error combination.
    pub fn set_property(&mut self, property: Property) {
        if self.selection.crop == Crop::Soybean && property == Property::Error {
            log::info!("property 'error' unavailable for soybean, keeping 'pred'");
            self.selection.property = Property::Pred;
        } else {
            self.selection.property = property;
        }
    }

    // Dataset commits (orchestrator only) --------------------------------

    pub fn commit_predictions(&mut self, records: Vec<PredictionRecord>) {
        self.predictions = records;
    }

    pub fn commit_historical(&mut self, records: Vec<HistoricalRecord>) {
        self.historical = records;
    }

    pub fn commit_averaged(&mut self, records: Vec<PredictionRecord>) {
        self.averaged = records;
    }

    pub fn commit_multi_year(&mut self, records: Vec<PredictionRecord>) {
        self.multi_year = records;
    }

    pub fn commit_county_reference(&mut self, grouped: HashMap<String, Vec<CountyReference>>) {
        self.county_reference = grouped;
    }

    pub fn commit_county_geocode(&mut self, geocode: HashMap<String, Coordinates>) {
        self.county_geocode = geocode;
    }

    // Dataset reads ------------------------------------------------------

    pub fn predictions(&self) -> &[PredictionRecord] {
        &self.predictions
    }

    pub fn historical(&self) -> &[HistoricalRecord] {
        &self.historical
    }

    pub fn averaged(&self) -> &[PredictionRecord] {
        &self.averaged
    }

    pub fn multi_year(&self) -> &[PredictionRecord] {
        &self.multi_year
    }

    /// Reference entries for a county name; a name may map to several
    /// counties in different states.
    pub fn county_metadata(&self, name: &str) -> Option<&[CountyReference]> {
        self.county_reference.get(name).map(Vec::as_slice)
    }

    pub fn county_reference(&self) -> &HashMap<String, Vec<CountyReference>> {
        &self.county_reference
    }

    pub fn geocode(&self, fips: &str) -> Option<Coordinates> {
        self.county_geocode.get(fips).copied()
    }

    /// The county name for a FIPS code, resolved against the reference
    /// table.
    pub fn county_name_for(&self, fips: &str) -> Option<String> {
        self.county_reference.values().flatten().find_map(|entry| {
            if entry.fips() == fips {
                Some(entry.name.clone())
            } else {
                None
            }
        })
    }

    // Cache --------------------------------------------------------------

    pub fn cache(&self) -> &KeyedCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut KeyedCache {
        &mut self.cache
    }

    pub fn cache_snapshot(&self) -> Vec<(CacheKey, usize)> {
        self.cache.snapshot()
    }

    // Choropleth / basemap -----------------------------------------------

    pub fn choropleth(&self) -> &ChoroplethSettings {
        &self.choropleth
    }

    pub fn choropleth_mut(&mut self) -> &mut ChoroplethSettings {
        &mut self.choropleth
    }

    pub fn set_basemap(&mut self, id: &str) {
        self.choropleth.set_basemap(id);
    }

    /// Tile URL for the active basemap, falling back to the first
    /// registry entry on an unknown id.
    pub fn basemap_url(&self) -> &'static str {
        basemap::basemap_url(self.choropleth.basemap_id())
    }

    /// Map title derived from the current crop, day, and year.
    pub fn map_title(&self) -> String {
        format!(
            "{} Yield Prediction ({} {})",
            self.selection.crop.label(),
            season_label(self.selection.year, &self.selection.day),
            self.selection.year
        )
    }

    // Selected counties --------------------------------------------------

    pub fn selected_counties(&self) -> &SelectedCounties {
        &self.selected_counties
    }

    pub fn selected_county_ids(&self) -> Vec<String> {
        self.selected_counties.ids()
    }

    /// Add a county by FIPS, resolving its display name from the
    /// reference table. No-op when already selected.
    pub fn add_selected_county(&mut self, fips: &str) {
        let name = self
            .county_name_for(fips)
            .unwrap_or_else(|| fips.to_string());
        self.selected_counties.add(fips, &name);
    }

    pub fn remove_selected_county(&mut self, fips: &str) {
        self.selected_counties.remove(fips);
    }

    pub fn update_county_input(&mut self, input: &str, suggestions: Vec<String>) {
        self.selected_counties.set_in_progress(input, suggestions);
    }

    /// County names matching a prefix, for the in-progress entry's
    /// suggestion list.
    pub fn county_suggestions(&self, prefix: &str) -> Vec<String> {
        let needle = prefix.to_lowercase();
        let mut names: Vec<String> = self
            .county_reference
            .keys()
            .filter(|name| name.to_lowercase().starts_with(&needle))
            .cloned()
            .collect();
        names.sort();
        names
    }

    // Drawn regions ------------------------------------------------------

    pub fn drawn_regions(&self) -> &[DrawnRegion] {
        &self.drawn_regions
    }

    /// Replace-all semantics; partial edits are not supported.
    pub fn set_drawn_regions(&mut self, regions: Vec<DrawnRegion>) {
        self.drawn_regions = regions;
    }

    pub fn clear_drawn_regions(&mut self) {
        self.drawn_regions.clear();
    }

    // Job queue (pure; durable mirroring is the orchestrator's job) ------

    pub fn jobs(&self) -> &[QueuedJob] {
        &self.jobs
    }

    pub fn enqueue_job(&mut self, job: QueuedJob) {
        jobs::enqueue(&mut self.jobs, job);
    }

    pub fn update_job(&mut self, job: QueuedJob) -> bool {
        jobs::update_by_id(&mut self.jobs, job)
    }

    pub fn clear_jobs(&mut self) {
        self.jobs.clear();
    }

    /// Bulk-replace the queue; used once at startup to rehydrate from
    /// durable storage before any other consumer reads it.
    pub fn replace_jobs(&mut self, queue: Vec<QueuedJob>) {
        self.jobs = queue;
    }
}

/// Cheaply cloneable handle sharing one [`AppState`] across a
/// single-threaded cooperative runtime.
#[derive(Debug, Clone, Default)]
pub struct StateHandle {
    inner: Rc<RefCell<AppState>>,
}

impl StateHandle {
    pub fn new() -> Self {
        StateHandle::default()
    }

    pub fn borrow(&self) -> Ref<'_, AppState> {
        self.inner.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, AppState> {
        self.inner.borrow_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soybean_forces_default_year_and_remaps_error() {
        let mut state = AppState::new();
        state.set_property(Property::Error);
        state.set_crop(Crop::Soybean);
        assert_eq!(state.selection().property, Property::Pred);
        assert_eq!(state.selection().year, Crop::Soybean.default_year());
    }

    #[test]
    fn corn_never_alters_property() {
        let mut state = AppState::new();
        state.set_property(Property::Uncertainty);
        state.set_crop(Crop::Soybean);
        state.set_crop(Crop::Corn);
        assert_eq!(state.selection().property, Property::Uncertainty);
    }

    #[test]
    fn set_property_clamps_soybean_error() {
        let mut state = AppState::new();
        state.set_crop(Crop::Soybean);
        state.set_property(Property::Error);
        assert_eq!(state.selection().property, Property::Pred);
    }

    #[test]
    fn set_day_zero_pads() {
        let mut state = AppState::new();
        state.set_day("84");
        assert_eq!(state.selection().day, "084");
    }

    #[test]
    fn map_title_uses_season_label() {
        let state = AppState::new();
        assert_eq!(state.map_title(), "Corn Yield Prediction (mid-October 2021)");
    }

    #[test]
    fn basemap_url_defaults_on_unknown_id() {
        let mut state = AppState::new();
        state.set_basemap("not-a-basemap");
        assert_eq!(state.basemap_url(), cyd_core::basemap::BASEMAPS[0].url);
    }

    #[test]
    fn selected_county_resolves_name_from_reference() {
        let mut state = AppState::new();
        let (grouped, _) = CountyReference::from_csv(
            "county,state_code,county_code\nAdams,17,1\n",
        );
        state.commit_county_reference(grouped);
        state.add_selected_county("17001");
        let entries = state.selected_counties().entries();
        assert_eq!(
            entries[0].resolved.as_ref().map(|r| r.name.as_str()),
            Some("Adams")
        );
    }

    #[test]
    fn county_suggestions_match_prefix_case_insensitively() {
        let mut state = AppState::new();
        let (grouped, _) = CountyReference::from_csv(
            "county,state_code,county_code\nAdams,17,1\nChampaign,17,19\nClark,17,23\n",
        );
        state.commit_county_reference(grouped);
        assert_eq!(state.county_suggestions("ch"), vec!["Champaign"]);
        assert_eq!(state.county_suggestions("c"), vec!["Champaign", "Clark"]);
    }

    #[test]
    fn drawn_regions_replace_all() {
        let mut state = AppState::new();
        state.set_drawn_regions(vec![DrawnRegion {
            vertices: vec![[40.0, -88.0], [40.1, -88.0], [40.1, -88.1]],
        }]);
        assert_eq!(state.drawn_regions().len(), 1);
        state.set_drawn_regions(Vec::new());
        assert!(state.drawn_regions().is_empty());
    }

    #[test]
    fn state_handle_shares_one_state() {
        let handle = StateHandle::new();
        let clone = handle.clone();
        handle.borrow_mut().set_year(2020);
        assert_eq!(clone.borrow().selection().year, 2020);
    }
}
