//! Normalized columnar store, built once per record set.
//!
//! Ingestion parses release dates, coerces numerics to finite values and
//! computes ROI. Nothing downstream re-reads the raw records.

use crate::domain::MovieRecord;
use serde::{Deserialize, Serialize};

/// Return on investment in percent. 0 when there is no budget.
pub fn roi(budget: f64, revenue: f64) -> f64 {
    if budget > 0.0 {
        (revenue - budget) / budget * 100.0
    } else {
        0.0
    }
}

/// One normalized row, detached from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRow {
    pub id: Option<i64>,
    pub title: String,
    pub year: Option<i32>,
    pub budget: f64,
    pub revenue: f64,
    pub roi: f64,
    pub vote_average: f64,
    pub popularity: f64,
    pub genre_ids: Vec<i64>,
    pub countries: Vec<String>,
}

/// Column-per-field storage. Row `i` is the `i`-th ingested record.
#[derive(Debug, Default)]
pub struct MovieStore {
    pub(crate) ids: Vec<Option<i64>>,
    pub(crate) titles: Vec<String>,
    pub(crate) years: Vec<Option<i32>>,
    pub(crate) budgets: Vec<f64>,
    pub(crate) revenues: Vec<f64>,
    pub(crate) rois: Vec<f64>,
    pub(crate) ratings: Vec<f64>,
    pub(crate) popularity: Vec<f64>,
    pub(crate) genre_ids: Vec<Vec<i64>>,
    pub(crate) countries: Vec<Vec<String>>,
}

impl MovieStore {
    pub fn ingest(records: &[MovieRecord]) -> Self {
        let n = records.len();
        let mut store = Self {
            ids: Vec::with_capacity(n),
            titles: Vec::with_capacity(n),
            years: Vec::with_capacity(n),
            budgets: Vec::with_capacity(n),
            revenues: Vec::with_capacity(n),
            rois: Vec::with_capacity(n),
            ratings: Vec::with_capacity(n),
            popularity: Vec::with_capacity(n),
            genre_ids: Vec::with_capacity(n),
            countries: Vec::with_capacity(n),
        };

        for record in records {
            let budget = record.budget();
            let revenue = record.revenue();
            store.ids.push(record.id());
            store.titles.push(record.title().to_string());
            store.years.push(record.year());
            store.budgets.push(budget);
            store.revenues.push(revenue);
            store.rois.push(roi(budget, revenue));
            store.ratings.push(record.vote_average());
            store.popularity.push(record.popularity());
            store.genre_ids.push(record.genre_ids());
            store.countries.push(
                record
                    .production_countries()
                    .into_iter()
                    .map(|c| c.name)
                    .collect(),
            );
        }

        store
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn row(&self, i: usize) -> MovieRow {
        MovieRow {
            id: self.ids[i],
            title: self.titles[i].clone(),
            year: self.years[i],
            budget: self.budgets[i],
            revenue: self.revenues[i],
            roi: self.rois[i],
            vote_average: self.ratings[i],
            popularity: self.popularity[i],
            genre_ids: self.genre_ids[i].clone(),
            countries: self.countries[i].clone(),
        }
    }
}
