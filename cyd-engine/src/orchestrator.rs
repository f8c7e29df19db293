//! Staged load sequencing and state commits.
//!
//! The startup sequence is strictly ordered because later stages read
//! earlier commits: per-selection prediction results, historical
//! yields, averaged predictions (with fallback), county reference,
//! county geocode, multi-year aggregate. Each stage is awaited and
//! committed before the next begins; a failed stage commits an empty
//! dataset and the rest still run. Commits that depend on the current
//! selection are tagged with the selection key captured at sequence
//! start and discarded when a faster re-selection has moved on.

use crate::loader;
use crate::paths;
use crate::source::DataSource;
use cyd_core::records::PredictionRecord;
use cyd_core::selection::{Crop, Property};
use cyd_db::JobStore;
use cyd_store::cache::{fetch_with_cache, CacheKey, DatasetKind};
use cyd_store::jobs::QueuedJob;
use cyd_store::{AppState, StateHandle};
use std::collections::HashMap;

/// The selection key active when a load sequence started.
type SelectionTag = (Crop, i32, String);

/// Cache-key day component for datasets not parameterized by day.
const NO_DAY: &str = "000";
/// Cache-key year component for the multi-year aggregate.
const ALL_YEARS: i32 = 0;

/// Sequences dependent dataset loads against a shared state store.
///
/// Holds no state beyond the data source and handles; all loaded data
/// lives in the state store, in-flight bookkeeping in the cache cells.
pub struct Orchestrator<S: DataSource> {
    source: S,
    state: StateHandle,
    job_store: JobStore,
}

impl<S: DataSource> Orchestrator<S> {
    pub fn new(source: S, state: StateHandle, job_store: JobStore) -> Self {
        Orchestrator {
            source,
            state,
            job_store,
        }
    }

    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    /// Run the canonical startup sequence for the current selection.
    pub async fn load_all(&self) {
        let tag: SelectionTag = self.state.borrow().selection().key();
        let (crop, year, day) = tag.clone();
        log::info!("loading datasets for {} {} day {}", crop.as_str(), year, day);

        // Stage 1: per-selection prediction results, memoized per key.
        let records = {
            let key = CacheKey::new(DatasetKind::PredictionCsv, crop, year, &day);
            let cell = self.state.borrow_mut().cache_mut().entry_cell(key);
            fetch_with_cache(cell, || async {
                loader::load_predictions(&self.source, crop, year, &day)
                    .await
                    .unwrap_or_else(|e| {
                        log::warn!("prediction load failed: {}", e);
                        Vec::new()
                    })
            })
            .await
        };
        self.commit_if_current(&tag, "prediction results", |state| {
            state.commit_predictions(records)
        });

        // Stage 2: historical yield series for the crop.
        let historical = loader::load_historical(&self.source, crop)
            .await
            .unwrap_or_else(|e| {
                log::warn!("historical yield load failed: {}", e);
                Vec::new()
            });
        self.commit_if_current(&tag, "historical yields", |state| {
            state.commit_historical(historical)
        });

        // Stage 3: averaged predictions, primary location with fallback.
        let averaged = {
            let key = CacheKey::new(DatasetKind::AveragedPrediction, crop, year, NO_DAY);
            let cell = self.state.borrow_mut().cache_mut().entry_cell(key);
            fetch_with_cache(cell, || self.load_averaged(crop, year)).await
        };
        self.commit_if_current(&tag, "averaged predictions", |state| {
            state.commit_averaged(averaged)
        });

        // Stages 4 and 5: county reference and geocode tables. These
        // depend on nothing and not on each other, so they run
        // concurrently; neither depends on the selection, so their
        // commits are unconditional.
        let (reference, geocode) = tokio::join!(
            loader::load_county_reference(&self.source),
            loader::load_county_geocode(&self.source)
        );
        {
            let mut state = self.state.borrow_mut();
            state.commit_county_reference(reference.unwrap_or_else(|e| {
                log::warn!("county reference load failed: {}", e);
                HashMap::new()
            }));
            state.commit_county_geocode(geocode.unwrap_or_else(|e| {
                log::warn!("county geocode load failed: {}", e);
                HashMap::new()
            }));
        }

        // Stage 6: multi-year prediction aggregate, keyed per crop.
        let multi_year = {
            let key = CacheKey::new(DatasetKind::MultiYearPrediction, crop, ALL_YEARS, NO_DAY);
            let cell = self.state.borrow_mut().cache_mut().entry_cell(key);
            fetch_with_cache(cell, || async {
                loader::load_multi_year(&self.source, crop)
                    .await
                    .unwrap_or_else(|e| {
                        log::warn!("multi-year load failed: {}", e);
                        Vec::new()
                    })
            })
            .await
        };
        self.commit_if_current(&tag, "multi-year aggregate", |state| {
            state.commit_multi_year(multi_year)
        });
    }

    /// Switch crops and rebuild all derived state, then force the
    /// prediction property and the crop's default year so no stale
    /// derived selection survives the switch.
    pub async fn activate_crop(&self, crop: Crop) {
        self.state.borrow_mut().set_crop(crop);
        self.load_all().await;
        let mut state = self.state.borrow_mut();
        state.set_property(Property::Pred);
        state.set_year(crop.default_year());
    }

    /// Primary location first; any failure logs and tries the static
    /// mirror; both failing yields an empty sequence, so consumers see
    /// "unavailable" rather than stale data.
    async fn load_averaged(&self, crop: Crop, year: i32) -> Vec<PredictionRecord> {
        match loader::predictions_at(&self.source, &paths::averaged_primary(crop, year)).await {
            Ok(records) => records,
            Err(primary) => {
                log::warn!("averaged primary failed ({}), trying mirror", primary);
                match loader::predictions_at(&self.source, &paths::averaged_secondary(crop, year))
                    .await
                {
                    Ok(records) => records,
                    Err(mirror) => {
                        log::warn!("averaged mirror failed ({}), committing empty", mirror);
                        Vec::new()
                    }
                }
            }
        }
    }

    fn commit_if_current<F>(&self, tag: &SelectionTag, stage: &str, commit: F)
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.state.borrow_mut();
        if state.selection().key() == *tag {
            commit(&mut state);
        } else {
            log::info!(
                "selection changed during load, discarding stale {} for {} {} day {}",
                stage,
                tag.0.as_str(),
                tag.1,
                tag.2
            );
        }
    }

    // Job queue ----------------------------------------------------------

    /// Rehydrate the job queue from durable storage. Called once at
    /// startup, before any other consumer reads the queue.
    pub fn restore_jobs(&self) {
        let queue = self.job_store.load_jobs().unwrap_or_default();
        log::info!("restored {} queued jobs", queue.len());
        self.state.borrow_mut().replace_jobs(queue);
    }

    pub fn enqueue_job(&self, job: QueuedJob) {
        self.state.borrow_mut().enqueue_job(job);
        self.mirror_jobs();
    }

    /// Replace a queued job by id; unknown ids leave both the queue and
    /// the durable copy untouched.
    pub fn update_job(&self, job: QueuedJob) -> bool {
        let updated = self.state.borrow_mut().update_job(job);
        if updated {
            self.mirror_jobs();
        }
        updated
    }

    pub fn clear_jobs(&self) {
        self.state.borrow_mut().clear_jobs();
        if let Err(e) = self.job_store.clear_jobs() {
            log::warn!("clearing persisted job queue failed: {}", e);
        }
    }

    /// Best-effort durable mirror of the in-memory queue; a write
    /// failure logs and never unwinds into the mutation that succeeded.
    fn mirror_jobs(&self) {
        let queue = self.state.borrow().jobs().to_vec();
        if let Err(e) = self.job_store.save_jobs(&queue) {
            log::warn!("persisting job queue failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyd_core::error::FetchError;
    use cyd_store::jobs::JobStatus;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    const PRED_CSV: &str = "\
FIPS,y_test_pred,y_test,y_test_pred_uncertainty
17001,150.2,148.0,3.1
";

    const COUNTY_CSV: &str = "\
county,state_code,county_code
Adams,17,1
";

    type Hook = Box<dyn FnMut(&str)>;

    struct StubSource {
        responses: HashMap<String, Result<String, FetchError>>,
        hits: Rc<RefCell<HashMap<String, u32>>>,
        on_fetch: RefCell<Option<Hook>>,
    }

    impl StubSource {
        fn new() -> Self {
            StubSource {
                responses: HashMap::new(),
                hits: Rc::new(RefCell::new(HashMap::new())),
                on_fetch: RefCell::new(None),
            }
        }

        fn with(mut self, path: &str, response: Result<&str, FetchError>) -> Self {
            self.responses
                .insert(path.to_string(), response.map(str::to_string));
            self
        }

        fn hits(&self, path: &str) -> u32 {
            self.hits.borrow().get(path).copied().unwrap_or(0)
        }
    }

    impl DataSource for StubSource {
        async fn get_text(&self, path: &str) -> Result<String, FetchError> {
            *self.hits.borrow_mut().entry(path.to_string()).or_insert(0) += 1;
            if let Some(hook) = self.on_fetch.borrow_mut().as_mut() {
                hook(path);
            }
            self.responses
                .get(path)
                .cloned()
                .unwrap_or(Err(FetchError::HttpStatus(404)))
        }
    }

    fn orchestrator(source: StubSource) -> Orchestrator<StubSource> {
        Orchestrator::new(source, StateHandle::new(), JobStore::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn committed_record_matches_fetched_row() {
        let orch = orchestrator(
            StubSource::new().with("result_corn/bnn/result2021_284.csv", Ok(PRED_CSV)),
        );
        orch.load_all().await;

        let state = orch.state().borrow();
        let records = state.predictions();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.fips, "17001");
        assert_eq!(r.pred, 150.2);
        assert_eq!(r.yield_value, 148.0);
        assert_eq!(r.uncertainty, 3.1);
        assert_eq!(r.error, 2.2);
    }

    #[tokio::test]
    async fn repeat_selection_is_served_from_cache() {
        let path = "result_corn/bnn/result2021_284.csv";
        let orch = orchestrator(StubSource::new().with(path, Ok(PRED_CSV)));
        orch.load_all().await;
        orch.load_all().await;
        assert_eq!(orch.source.hits(path), 1, "second sequence must not refetch");
        assert_eq!(orch.state().borrow().predictions().len(), 1);
    }

    #[tokio::test]
    async fn averaged_falls_back_to_mirror() {
        let secondary = "\
FIPS,y_test_pred,y_test,y_test_pred_uncertainty
19001,120.0,119.0,2.0
";
        let orch = orchestrator(
            StubSource::new()
                .with(
                    "result_corn/bnn/average/avg2021.csv",
                    Err(FetchError::HttpStatus(500)),
                )
                .with("static/corn/avg2021.csv", Ok(secondary)),
        );
        orch.load_all().await;

        let state = orch.state().borrow();
        assert_eq!(state.averaged().len(), 1);
        assert_eq!(state.averaged()[0].fips, "19001");
    }

    #[tokio::test]
    async fn averaged_commits_empty_when_both_paths_fail() {
        let orch = orchestrator(StubSource::new());
        orch.state().borrow_mut().commit_averaged(vec![PredictionRecord {
            fips: "99999".into(),
            pred: 1.0,
            yield_value: 1.0,
            uncertainty: 1.0,
            error: 0.0,
        }]);
        orch.load_all().await;
        assert!(
            orch.state().borrow().averaged().is_empty(),
            "a double failure must commit empty, not leave the prior value stale"
        );
    }

    #[tokio::test]
    async fn one_failed_stage_does_not_block_the_rest() {
        // Predictions 404, but the county reference still loads.
        let orch = orchestrator(StubSource::new().with("counties/county_state.csv", Ok(COUNTY_CSV)));
        orch.load_all().await;

        let state = orch.state().borrow();
        assert!(state.predictions().is_empty());
        assert_eq!(state.county_metadata("Adams").map(<[_]>::len), Some(1));
    }

    #[tokio::test]
    async fn stale_commit_is_discarded_after_reselection() {
        let mut source =
            StubSource::new().with("result_corn/bnn/result2021_284.csv", Ok(PRED_CSV));
        let state = StateHandle::new();
        // Simulate the user changing the year while the first fetch is
        // still in flight.
        let racing = state.clone();
        source.on_fetch = RefCell::new(Some(Box::new(move |path: &str| {
            if path.ends_with("result2021_284.csv") {
                racing.borrow_mut().set_year(2020);
            }
        })));
        let orch = Orchestrator::new(source, state, JobStore::open_in_memory().unwrap());
        orch.load_all().await;

        let state = orch.state().borrow();
        assert!(
            state.predictions().is_empty(),
            "a commit for a superseded selection must be discarded"
        );
        assert_eq!(state.selection().year, 2020);
    }

    #[tokio::test]
    async fn activate_crop_forces_prediction_property_and_default_year() {
        let orch = orchestrator(StubSource::new());
        {
            let mut state = orch.state().borrow_mut();
            state.set_property(Property::Uncertainty);
            state.set_year(2019);
        }
        orch.activate_crop(Crop::Soybean).await;

        let state = orch.state().borrow();
        assert_eq!(state.selection().crop, Crop::Soybean);
        assert_eq!(state.selection().property, Property::Pred);
        assert_eq!(state.selection().year, Crop::Soybean.default_year());
    }

    fn job(id: u64, status: JobStatus) -> QueuedJob {
        QueuedJob {
            id,
            crop: Crop::Corn,
            year: 2021,
            day: "284".into(),
            status,
        }
    }

    #[test]
    fn enqueue_mirrors_queue_to_durable_storage() {
        let store = JobStore::open_in_memory().unwrap();
        let orch = Orchestrator::new(StubSource::new(), StateHandle::new(), store.clone());
        orch.enqueue_job(job(1, JobStatus::Pending));
        assert_eq!(store.load_jobs().unwrap().len(), 1);
    }

    #[test]
    fn queue_rehydrates_after_simulated_reload() {
        let store = JobStore::open_in_memory().unwrap();
        {
            let orch = Orchestrator::new(StubSource::new(), StateHandle::new(), store.clone());
            orch.enqueue_job(job(1, JobStatus::Pending));
        }
        // Fresh state over the same durable store.
        let orch = Orchestrator::new(StubSource::new(), StateHandle::new(), store);
        orch.restore_jobs();
        assert_eq!(orch.state().borrow().jobs(), &[job(1, JobStatus::Pending)]);
    }

    #[test]
    fn update_job_mirrors_replacement() {
        let store = JobStore::open_in_memory().unwrap();
        let orch = Orchestrator::new(StubSource::new(), StateHandle::new(), store.clone());
        orch.enqueue_job(job(1, JobStatus::Pending));
        assert!(orch.update_job(job(1, JobStatus::Running)));
        assert_eq!(store.load_jobs().unwrap()[0].status, JobStatus::Running);
        assert!(!orch.update_job(job(9, JobStatus::Done)));
    }

    #[test]
    fn clear_jobs_clears_durable_copy() {
        let store = JobStore::open_in_memory().unwrap();
        let orch = Orchestrator::new(StubSource::new(), StateHandle::new(), store.clone());
        orch.enqueue_job(job(1, JobStatus::Pending));
        orch.clear_jobs();
        assert!(orch.state().borrow().jobs().is_empty());
        assert!(store.load_jobs().is_none());
    }
}
