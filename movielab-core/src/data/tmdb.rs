//! TMDB catalog provider.
//!
//! Talks to the v3 REST API with an `api_key` query parameter. Every call is a
//! single blocking request: no retries and no backoff. Pacing between pages is
//! the fetcher's job.

use super::provider::{CatalogProvider, DiscoverPage, FetchError, MovieDetails};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default API root.
pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// TMDB v3 API client.
pub struct TmdbClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Client against the public API with a 30 second request timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_settings(TMDB_BASE_URL, api_key, Duration::from_secs(30))
    }

    pub fn with_settings(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("movielab/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}{endpoint}` and decode the JSON body.
    ///
    /// Errors never carry the full URL, which would leak the API key.
    fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{endpoint}", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        resp.json::<T>().map_err(|e| FetchError::Malformed {
            endpoint: endpoint.to_string(),
            reason: e.without_url().to_string(),
        })
    }
}

impl CatalogProvider for TmdbClient {
    fn name(&self) -> &str {
        "tmdb"
    }

    fn discover(&self, year: i32, page: u32) -> Result<DiscoverPage, FetchError> {
        self.get_json(
            "/discover/movie",
            &[
                ("primary_release_year", year.to_string()),
                ("page", page.to_string()),
                ("sort_by", "popularity.desc".to_string()),
            ],
        )
    }

    fn movie_details(&self, id: i64) -> Result<MovieDetails, FetchError> {
        self.get_json(&format!("/movie/{id}"), &[])
    }
}
