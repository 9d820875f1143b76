//! MovieLab Core: catalog fetching, record caching, and movie aggregation.
//!
//! This crate contains:
//! - The semi-structured movie record and the fixed genre table
//! - A paginated catalog fetcher with per-movie enrichment (TMDB provider)
//! - A year-range keyed record cache with file and in-memory stores
//! - A columnar aggregation engine with immutable filtered views
//! - Parquet and CSV export of the normalized table and query results
//! - TOML configuration

pub mod analytics;
pub mod config;
pub mod data;
pub mod domain;
pub mod export;

pub use analytics::{MovieFrame, SummaryStats, YearRange};
pub use config::MovieLabConfig;
pub use domain::MovieRecord;
