//! Semi-structured movie record.
//!
//! A `MovieRecord` is the JSON object the catalog returned (plus the fields
//! added during enrichment), kept verbatim so cache files round-trip without
//! loss. Typed accessors coerce on read: malformed numerics become 0,
//! malformed lists become empty, and only the year may come back as `None`.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A country descriptor from `production_countries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCountry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso_3166_1: Option<String>,
    pub name: String,
}

/// One movie as fetched from the catalog or loaded from the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieRecord {
    fields: Map<String, Value>,
}

impl MovieRecord {
    /// Empty record with no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value. Returns `None` unless the value is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// The raw field map.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    pub fn id(&self) -> Option<i64> {
        self.get("id").and_then(coerce_i64)
    }

    /// Title, or the empty string when missing or not a string.
    pub fn title(&self) -> &str {
        self.get("title").and_then(Value::as_str).unwrap_or("")
    }

    /// Parsed release date, if present and well-formed.
    pub fn release_date(&self) -> Option<NaiveDate> {
        self.get("release_date")
            .and_then(Value::as_str)
            .and_then(parse_release_date)
    }

    /// The `year` tag assigned at fetch time.
    pub fn year_tag(&self) -> Option<i32> {
        self.get("year")
            .and_then(coerce_i64)
            .and_then(|y| i32::try_from(y).ok())
    }

    /// Release year, falling back to the fetch-time tag.
    pub fn year(&self) -> Option<i32> {
        self.release_date()
            .map(|d| d.year())
            .or_else(|| self.year_tag())
    }

    pub fn budget(&self) -> f64 {
        coerce_f64(self.get("budget"))
    }

    pub fn revenue(&self) -> f64 {
        coerce_f64(self.get("revenue"))
    }

    pub fn vote_average(&self) -> f64 {
        coerce_f64(self.get("vote_average"))
    }

    pub fn popularity(&self) -> f64 {
        coerce_f64(self.get("popularity"))
    }

    /// Genre codes in source order. Non-integer entries are skipped.
    pub fn genre_ids(&self) -> Vec<i64> {
        match self.get("genre_ids") {
            Some(Value::Array(ids)) => ids.iter().filter_map(Value::as_i64).collect(),
            _ => Vec::new(),
        }
    }

    /// Production countries. Entries without a string `name` are skipped.
    pub fn production_countries(&self) -> Vec<ProductionCountry> {
        let Some(Value::Array(items)) = self.get("production_countries") else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| {
                let obj = item.as_object()?;
                let name = obj.get("name")?.as_str()?;
                Some(ProductionCountry {
                    iso_3166_1: obj
                        .get("iso_3166_1")
                        .and_then(Value::as_str)
                        .map(String::from),
                    name: name.to_string(),
                })
            })
            .collect()
    }
}

impl From<Map<String, Value>> for MovieRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Accepts `YYYY-MM-DD`, RFC 3339, and `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Numeric coercion: numbers and numeric strings parse, everything else is 0.
pub(crate) fn coerce_f64(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
