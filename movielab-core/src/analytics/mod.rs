//! Aggregation engine: a columnar store ingested once, immutable views over
//! it, and report-style queries against a view.

pub mod frame;
pub mod queries;
pub mod stats;
pub mod store;
pub mod summary;

pub use frame::{MovieFrame, YearRange};
pub use queries::{
    restrict_to_genres, top_genres, Correlation, CorrelationPoint, CountryCount, CountrySpending,
    GenreYearCount, RoiEntry,
};
pub use store::{roi, MovieRow, MovieStore};
pub use summary::{SummaryStats, NOT_AVAILABLE};
