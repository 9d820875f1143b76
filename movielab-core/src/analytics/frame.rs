//! Immutable views over a shared movie store.
//!
//! A `MovieFrame` is an `Arc` to the store plus the row indices it selects.
//! Filtering narrows the index list; the store is never copied or mutated.

use super::store::{MovieRow, MovieStore};
use crate::domain::MovieRecord;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Inclusive year bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub low: i32,
    pub high: i32,
}

impl YearRange {
    pub fn new(low: i32, high: i32) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.low <= year && year <= self.high
    }
}

/// Queryable view of a movie record set.
#[derive(Debug, Clone)]
pub struct MovieFrame {
    store: Arc<MovieStore>,
    rows: Arc<[usize]>,
}

impl MovieFrame {
    /// Ingest records into a fresh store and view all of it.
    pub fn new(records: &[MovieRecord]) -> Self {
        let store = MovieStore::ingest(records);
        tracing::debug!(rows = store.len(), "ingested movie records");
        Self::from_store(Arc::new(store))
    }

    pub fn from_store(store: Arc<MovieStore>) -> Self {
        let rows = (0..store.len()).collect();
        Self { store, rows }
    }

    /// Narrow the view by year range and minimum rating.
    ///
    /// `None` skips the year test; rows without a year fail it otherwise.
    /// A `min_rating` of zero or below skips the rating test.
    pub fn filter(&self, year_range: Option<YearRange>, min_rating: f64) -> MovieFrame {
        let store = &self.store;
        let rows = self
            .rows
            .iter()
            .copied()
            .filter(|&i| match year_range {
                Some(range) => store.years[i].is_some_and(|y| range.contains(y)),
                None => true,
            })
            .filter(|&i| min_rating <= 0.0 || store.ratings[i] >= min_rating)
            .collect();

        MovieFrame {
            store: Arc::clone(&self.store),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct years present in the view, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.iter().filter_map(|i| self.store.years[i]).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Detached copies of every row in the view.
    pub fn rows(&self) -> Vec<MovieRow> {
        self.iter().map(|i| self.store.row(i)).collect()
    }

    pub(crate) fn store(&self) -> &MovieStore {
        &self.store
    }

    /// Store indices of the rows in this view, in ingestion order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().copied()
    }
}
