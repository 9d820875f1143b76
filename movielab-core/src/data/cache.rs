//! Record cache keyed by year range.
//!
//! Layout of the file-backed store:
//! - `{cache_dir}/movies_{start}_{end}.json`: the raw record list, pretty JSON
//! - `{cache_dir}/movies_{start}_{end}.meta.json`: sidecar (count, hash, time)
//!
//! Writes are atomic (write to .tmp, rename into place). A record file that
//! fails to parse is quarantined (`.quarantined` suffix) and reported as a miss.

use crate::domain::MovieRecord;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::warn;

/// Errors from cache storage.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Exact year range a cache entry covers. No partial-range matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub start_year: i32,
    pub end_year: i32,
}

impl CacheKey {
    pub fn new(start_year: i32, end_year: i32) -> Self {
        Self {
            start_year,
            end_year,
        }
    }

    /// `movies_{start}_{end}`
    pub fn file_stem(&self) -> String {
        format!("movies_{}_{}", self.start_year, self.end_year)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_year, self.end_year)
    }
}

/// Keyed persistent storage for fetched record lists.
pub trait CacheStore: Send + Sync {
    /// Records stored under `key`, or `None` on a miss.
    fn load(&self, key: CacheKey) -> Result<Option<Vec<MovieRecord>>, CacheError>;

    /// Store `records` under `key`, replacing any previous entry.
    fn save(&self, key: CacheKey, records: &[MovieRecord]) -> Result<(), CacheError>;
}

/// Sidecar describing one cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMeta {
    pub start_year: i32,
    pub end_year: i32,
    pub record_count: usize,
    pub data_hash: String,
    pub cached_at: NaiveDateTime,
}

impl CacheMeta {
    pub fn key(&self) -> CacheKey {
        CacheKey::new(self.start_year, self.end_year)
    }
}

/// One JSON file per year range.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    cache_dir: PathBuf,
}

impl JsonFileCache {
    /// The directory is created on first write.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn records_path(&self, key: CacheKey) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key.file_stem()))
    }

    fn meta_path(&self, key: CacheKey) -> PathBuf {
        self.cache_dir.join(format!("{}.meta.json", key.file_stem()))
    }

    /// Sidecar for a key, if present and readable.
    pub fn get_meta(&self, key: CacheKey) -> Option<CacheMeta> {
        let content = fs::read_to_string(self.meta_path(key)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Every entry with a readable sidecar, ordered by key.
    pub fn status(&self) -> Result<Vec<CacheMeta>, CacheError> {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CacheError::io(&self.cache_dir, e)),
        };

        let mut metas = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| CacheError::io(&self.cache_dir, e))?.path();
            let is_meta = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("movies_") && n.ends_with(".meta.json"));
            if !is_meta {
                continue;
            }
            match fs::read_to_string(&path)
                .ok()
                .and_then(|c| serde_json::from_str::<CacheMeta>(&c).ok())
            {
                Some(meta) => metas.push(meta),
                None => warn!("unreadable cache sidecar {}", path.display()),
            }
        }

        metas.sort_by_key(CacheMeta::key);
        Ok(metas)
    }

    /// Remove one entry and its sidecar. Missing files are not an error.
    pub fn remove(&self, key: CacheKey) -> Result<(), CacheError> {
        for path in [self.records_path(key), self.meta_path(key)] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(CacheError::io(&path, e)),
            }
        }
        Ok(())
    }

    /// Remove every entry. Returns how many record files were deleted.
    pub fn clear(&self) -> Result<usize, CacheError> {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(CacheError::io(&self.cache_dir, e)),
        };

        let mut removed = 0;
        for entry in entries {
            let path = entry.map_err(|e| CacheError::io(&self.cache_dir, e))?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.starts_with("movies_") || !path.is_file() {
                continue;
            }
            fs::remove_file(&path).map_err(|e| CacheError::io(&path, e))?;
            if name.ends_with(".json") && !name.ends_with(".meta.json") {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn quarantine(&self, path: &Path, reason: &str) {
        let mut target = path.as_os_str().to_owned();
        target.push(".quarantined");
        warn!("quarantining corrupt cache file {}: {reason}", path.display());
        let _ = fs::rename(path, PathBuf::from(target));
    }
}

impl CacheStore for JsonFileCache {
    fn load(&self, key: CacheKey) -> Result<Option<Vec<MovieRecord>>, CacheError> {
        let path = self.records_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(&path, e)),
        };

        let values: Vec<Value> = match serde_json::from_str(&content) {
            Ok(values) => values,
            Err(e) => {
                self.quarantine(&path, &e.to_string());
                return Ok(None);
            }
        };

        let total = values.len();
        let records: Vec<MovieRecord> = values
            .into_iter()
            .filter_map(MovieRecord::from_value)
            .collect();
        if records.len() < total {
            warn!(
                key = %key,
                skipped = total - records.len(),
                "cache entry contained non-object records"
            );
        }
        Ok(Some(records))
    }

    fn save(&self, key: CacheKey, records: &[MovieRecord]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.cache_dir).map_err(|e| CacheError::io(&self.cache_dir, e))?;

        let json = serde_json::to_string_pretty(records)?;
        let path = self.records_path(key);
        write_atomic(&path, json.as_bytes())?;

        let meta = CacheMeta {
            start_year: key.start_year,
            end_year: key.end_year,
            record_count: records.len(),
            data_hash: blake3::hash(json.as_bytes()).to_hex().to_string(),
            cached_at: chrono::Local::now().naive_local(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)?;
        write_atomic(&self.meta_path(key), meta_json.as_bytes())?;

        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes).map_err(|e| CacheError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        CacheError::io(path, e)
    })
}

/// In-process store, for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, Vec<MovieRecord>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: CacheKey) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCache {
    fn load(&self, key: CacheKey) -> Result<Option<Vec<MovieRecord>>, CacheError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned())
    }

    fn save(&self, key: CacheKey, records: &[MovieRecord]) -> Result<(), CacheError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, records.to_vec());
        Ok(())
    }
}
