//! Catalog provider trait and structured error types.
//!
//! The `CatalogProvider` trait abstracts over the remote movie catalog so the
//! fetcher can be driven by the TMDB client in production and by a scripted
//! provider in tests.

use crate::domain::MovieRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Failure of a single catalog request.
///
/// The fetcher never propagates these; a failed request means "no data".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status} from {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("malformed response from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },
}

/// One page of the "discover movies" listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverPage {
    #[serde(default)]
    pub page: u32,
    pub results: Vec<Value>,
    #[serde(default = "one")]
    pub total_pages: u32,
}

fn one() -> u32 {
    1
}

/// Per-movie detail fields merged into a discovered record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(default = "zero")]
    pub budget: Value,
    #[serde(default = "zero")]
    pub revenue: Value,
    #[serde(default = "zero")]
    pub runtime: Value,
    #[serde(default = "empty_list")]
    pub production_countries: Value,
    #[serde(default = "empty_list")]
    pub production_companies: Value,
}

fn zero() -> Value {
    Value::from(0)
}

fn empty_list() -> Value {
    Value::Array(Vec::new())
}

impl Default for MovieDetails {
    fn default() -> Self {
        Self {
            budget: zero(),
            revenue: zero(),
            runtime: zero(),
            production_countries: empty_list(),
            production_companies: empty_list(),
        }
    }
}

impl MovieDetails {
    /// Copy the detail fields onto a record, overwriting existing values.
    pub fn apply_to(&self, record: &mut MovieRecord) {
        record.insert("budget", self.budget.clone());
        record.insert("revenue", self.revenue.clone());
        record.insert("runtime", self.runtime.clone());
        record.insert("production_countries", self.production_countries.clone());
        record.insert("production_companies", self.production_companies.clone());
    }
}

/// Remote movie catalog.
pub trait CatalogProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// One page of movies released in `year`, most popular first.
    fn discover(&self, year: i32, page: u32) -> Result<DiscoverPage, FetchError>;

    /// Financial and production details for one movie.
    fn movie_details(&self, id: i64) -> Result<MovieDetails, FetchError>;
}

/// Progress callbacks for a multi-year fetch.
pub trait FetchProgress: Send {
    /// Called before the first page of a year is requested.
    fn on_year_start(&self, year: i32, index: usize, total: usize);

    /// Called after a page has been fetched and enriched.
    fn on_page(&self, year: i32, page: u32, movies: usize);

    /// Called when pagination for a year has ended.
    fn on_year_complete(&self, year: i32, movies: usize);

    /// Called once all years are done.
    fn on_batch_complete(&self, movies: usize, years: usize);
}

/// Progress reporter that forwards to `tracing`.
pub struct LogProgress;

impl FetchProgress for LogProgress {
    fn on_year_start(&self, year: i32, index: usize, total: usize) {
        tracing::info!("[{}/{}] fetching movies from {year}", index + 1, total);
    }

    fn on_page(&self, year: i32, page: u32, movies: usize) {
        tracing::debug!(year, page, movies, "page fetched");
    }

    fn on_year_complete(&self, year: i32, movies: usize) {
        tracing::info!(year, movies, "year complete");
    }

    fn on_batch_complete(&self, movies: usize, years: usize) {
        tracing::info!("fetch complete: {movies} movies across {years} years");
    }
}

/// Progress reporter that reports nothing.
pub struct SilentProgress;

impl FetchProgress for SilentProgress {
    fn on_year_start(&self, _year: i32, _index: usize, _total: usize) {}
    fn on_page(&self, _year: i32, _page: u32, _movies: usize) {}
    fn on_year_complete(&self, _year: i32, _movies: usize) {}
    fn on_batch_complete(&self, _movies: usize, _years: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn discover_page_defaults_total_pages() {
        let page: DiscoverPage = serde_json::from_value(json!({ "results": [] })).unwrap();
        assert_eq!(page.total_pages, 1);
        assert!(page.results.is_empty());
    }

    #[test]
    fn discover_page_requires_results() {
        let parsed = serde_json::from_value::<DiscoverPage>(json!({ "total_pages": 3 }));
        assert!(parsed.is_err());
    }

    #[test]
    fn details_default_missing_fields() {
        let details: MovieDetails =
            serde_json::from_value(json!({ "budget": 5000, "title": "ignored" })).unwrap();
        assert_eq!(details.budget, json!(5000));
        assert_eq!(details.revenue, json!(0));
        assert_eq!(details.production_countries, json!([]));
    }

    #[test]
    fn details_overwrite_record_fields() {
        let mut record = MovieRecord::from_value(json!({ "id": 1, "budget": 1 })).unwrap();
        let details = MovieDetails {
            budget: json!(2_000_000),
            production_countries: json!([{ "name": "France" }]),
            ..MovieDetails::default()
        };
        details.apply_to(&mut record);
        assert_eq!(record.budget(), 2_000_000.0);
        assert_eq!(record.production_countries()[0].name, "France");
        assert_eq!(record.get("production_companies"), Some(&json!([])));
    }
}
