//! Cache-or-fetch resolution for a year range.
//!
//! 1. A non-empty cache entry for the exact range → use it
//! 2. Otherwise fetch from the provider
//! 3. Persist the fetched records (only if non-empty) and return them
//!
//! During resolution, cache read/write failures are logged and degrade to a
//! miss or an unsaved result; only the explicit `save_cache` reports them.

use super::cache::{CacheError, CacheKey, CacheStore};
use super::fetcher::CatalogFetcher;
use super::provider::CatalogProvider;
use crate::domain::MovieRecord;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Pages requested per year unless configured otherwise.
pub const DEFAULT_MAX_PAGES_PER_YEAR: u32 = 5;

/// Where a record set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordSource {
    Cache,
    Remote,
}

/// Records for a year range plus their provenance.
#[derive(Debug, Clone)]
pub struct LoadedMovies {
    pub key: CacheKey,
    pub records: Vec<MovieRecord>,
    pub source: RecordSource,
}

/// Fetcher and cache store wired together.
pub struct Catalog<P, S> {
    fetcher: CatalogFetcher<P>,
    store: S,
    max_pages_per_year: u32,
}

impl<P: CatalogProvider, S: CacheStore> Catalog<P, S> {
    pub fn new(fetcher: CatalogFetcher<P>, store: S) -> Self {
        Self {
            fetcher,
            store,
            max_pages_per_year: DEFAULT_MAX_PAGES_PER_YEAR,
        }
    }

    pub fn with_max_pages_per_year(mut self, max_pages: u32) -> Self {
        self.max_pages_per_year = max_pages;
        self
    }

    pub fn fetcher(&self) -> &CatalogFetcher<P> {
        &self.fetcher
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Cached records for `key`; `None` on a miss or an unreadable store.
    pub fn load_cache(&self, key: CacheKey) -> Option<Vec<MovieRecord>> {
        match self.store.load(key) {
            Ok(records) => records,
            Err(e) => {
                warn!(key = %key, "cache read failed, treating as miss: {e}");
                None
            }
        }
    }

    /// Persist `records` under `key`, overwriting any previous entry.
    pub fn save_cache(&self, key: CacheKey, records: &[MovieRecord]) -> Result<(), CacheError> {
        self.store.save(key, records)
    }

    /// Cached records for the exact range, or a fresh fetch.
    pub fn get_or_fetch(&self, start_year: i32, end_year: i32) -> LoadedMovies {
        let key = CacheKey::new(start_year, end_year);

        if let Some(records) = self.load_cache(key).filter(|r| !r.is_empty()) {
            info!(key = %key, movies = records.len(), "loaded movies from cache");
            return LoadedMovies {
                key,
                records,
                source: RecordSource::Cache,
            };
        }

        info!(key = %key, "no cached movies, fetching from {}", self.fetcher.provider().name());
        self.fetch_and_store(key)
    }

    /// Fetch the range even if it is cached, replacing the cache entry.
    pub fn force_refresh(&self, start_year: i32, end_year: i32) -> LoadedMovies {
        self.fetch_and_store(CacheKey::new(start_year, end_year))
    }

    fn fetch_and_store(&self, key: CacheKey) -> LoadedMovies {
        let records =
            self.fetcher
                .fetch_movies(key.start_year, key.end_year, self.max_pages_per_year);

        if records.is_empty() {
            warn!(key = %key, "fetch returned no movies, nothing cached");
        } else {
            match self.store.save(key, &records) {
                Ok(()) => info!(key = %key, movies = records.len(), "saved movies to cache"),
                Err(e) => warn!(key = %key, "failed to cache fetched movies: {e}"),
            }
        }

        LoadedMovies {
            key,
            records,
            source: RecordSource::Remote,
        }
    }
}
