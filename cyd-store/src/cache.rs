//! Keyed cache of fetched prediction record sets.
//!
//! One entry per (dataset kind, crop, year, day) key, created on the
//! first fill and never evicted within a session. Entries are backed by
//! `tokio::sync::OnceCell` so concurrent misses for the same key await
//! a single pending fill instead of issuing duplicate requests; empty
//! results are cached too, so a failing fetch is not retried until the
//! next session.

use cyd_core::records::PredictionRecord;
use cyd_core::selection::Crop;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// The dataset families served by the backend.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum DatasetKind {
    PredictionCsv,
    HistoricalYield,
    AveragedPrediction,
    CountyReference,
    CountyGeocode,
    MultiYearPrediction,
}

/// Composite cache key: dataset kind plus the fetch-parameterizing
/// selection key.
#[derive(Debug, PartialEq, Eq, Clone, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub kind: DatasetKind,
    pub crop: Crop,
    pub year: i32,
    /// Zero-padded 3-digit day-of-year.
    pub day: String,
}

impl CacheKey {
    pub fn new(kind: DatasetKind, crop: Crop, year: i32, day: &str) -> Self {
        CacheKey {
            kind,
            crop,
            year,
            day: cyd_core::selection::pad_day(day),
        }
    }
}

/// A shared, fill-once cache slot.
pub type CacheCell = Arc<OnceCell<Vec<PredictionRecord>>>;

/// Session-lifetime cache of normalized record sets, bounded by the
/// feasible key space rather than by time.
#[derive(Debug, Default)]
pub struct KeyedCache {
    entries: HashMap<CacheKey, CacheCell>,
}

impl KeyedCache {
    /// Look up a filled entry. Pending (in-flight) entries answer miss.
    pub fn get(&self, key: &CacheKey) -> Option<&[PredictionRecord]> {
        self.entries
            .get(key)
            .and_then(|cell| cell.get())
            .map(Vec::as_slice)
    }

    /// Idempotent overwrite: a refresh installs a new entry rather than
    /// mutating the old one in place.
    pub fn put(&mut self, key: CacheKey, records: Vec<PredictionRecord>) {
        self.entries
            .insert(key, Arc::new(OnceCell::new_with(Some(records))));
    }

    /// The shared cell for a key, created empty on first access. The
    /// caller fills it via [`fetch_with_cache`] without holding a
    /// borrow of the cache across the await.
    pub fn entry_cell(&mut self, key: CacheKey) -> CacheCell {
        self.entries.entry(key).or_default().clone()
    }

    /// Filled keys and their record counts, for the rendering layer's
    /// cache inspector.
    pub fn snapshot(&self) -> Vec<(CacheKey, usize)> {
        let mut filled: Vec<(CacheKey, usize)> = self
            .entries
            .iter()
            .filter_map(|(key, cell)| cell.get().map(|records| (key.clone(), records.len())))
            .collect();
        filled.sort_by(|a, b| (a.0.year, &a.0.day).cmp(&(b.0.year, &b.0.day)));
        filled
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve a cache cell: return the cached records on a hit, otherwise
/// run `producer` (at most once per key, even under concurrent misses)
/// and cache its result, empty or not.
pub async fn fetch_with_cache<F, Fut>(cell: CacheCell, producer: F) -> Vec<PredictionRecord>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Vec<PredictionRecord>>,
{
    cell.get_or_init(producer).await.clone()
}
