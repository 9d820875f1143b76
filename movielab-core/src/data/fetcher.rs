//! Fetch orchestrator: paginates discovery per year and enriches each movie.

use super::provider::{CatalogProvider, FetchProgress, LogProgress};
use crate::domain::MovieRecord;
use serde_json::Value;
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Pause between page requests.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(250);

/// Walks a year range against a catalog provider.
pub struct CatalogFetcher<P> {
    provider: P,
    page_delay: Duration,
    progress: Box<dyn FetchProgress>,
}

impl<P: CatalogProvider> CatalogFetcher<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            page_delay: DEFAULT_PAGE_DELAY,
            progress: Box::new(LogProgress),
        }
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn with_progress(mut self, progress: Box<dyn FetchProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch every discovered movie for `start_year..=end_year`.
    ///
    /// Pagination for a year stops after `max_pages_per_year` pages, when the
    /// provider reports no further pages, or at the first failed page request.
    /// Failures are logged and never returned.
    pub fn fetch_movies(
        &self,
        start_year: i32,
        end_year: i32,
        max_pages_per_year: u32,
    ) -> Vec<MovieRecord> {
        let total_years = (start_year..=end_year).count();
        let mut movies = Vec::new();

        for (index, year) in (start_year..=end_year).enumerate() {
            self.progress.on_year_start(year, index, total_years);
            let before = movies.len();

            for page in 1..=max_pages_per_year {
                let listing = match self.provider.discover(year, page) {
                    Ok(listing) => listing,
                    Err(e) => {
                        warn!(
                            provider = self.provider.name(),
                            year,
                            page,
                            "discover request failed, ending pagination: {e}"
                        );
                        break;
                    }
                };

                let count = listing.results.len();
                for raw in listing.results {
                    match MovieRecord::from_value(raw) {
                        Some(mut record) => {
                            record.insert("year", Value::from(year));
                            self.enrich(&mut record);
                            movies.push(record);
                        }
                        None => warn!(year, page, "skipping non-object discover result"),
                    }
                }
                self.progress.on_page(year, page, count);

                if !self.page_delay.is_zero() {
                    thread::sleep(self.page_delay);
                }

                if page >= listing.total_pages {
                    break;
                }
            }

            self.progress.on_year_complete(year, movies.len() - before);
        }

        self.progress.on_batch_complete(movies.len(), total_years);
        movies
    }

    /// Merge detail fields into a record. A failed lookup leaves it untouched.
    fn enrich(&self, record: &mut MovieRecord) {
        let Some(id) = record.id() else {
            warn!("discovered movie without an id, not enriched");
            return;
        };
        match self.provider.movie_details(id) {
            Ok(details) => details.apply_to(record),
            Err(e) => warn!(id, "detail request failed: {e}"),
        }
    }
}
