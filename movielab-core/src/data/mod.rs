//! Catalog fetching and record caching

pub mod cache;
pub mod catalog;
pub mod fetcher;
pub mod provider;
pub mod tmdb;

pub use cache::{CacheError, CacheKey, CacheMeta, CacheStore, JsonFileCache, MemoryCache};
pub use catalog::{Catalog, LoadedMovies, RecordSource, DEFAULT_MAX_PAGES_PER_YEAR};
pub use fetcher::{CatalogFetcher, DEFAULT_PAGE_DELAY};
pub use provider::{
    CatalogProvider, DiscoverPage, FetchError, FetchProgress, LogProgress, MovieDetails,
    SilentProgress,
};
pub use tmdb::{TmdbClient, TMDB_BASE_URL};
