//! Table export: Parquet for the normalized rows, CSV for query results.

use crate::analytics::{CountryCount, CountrySpending, GenreYearCount, MovieFrame, RoiEntry};
use polars::prelude::*;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("parquet error: {0}")]
    Parquet(String),
}

// ── Parquet ─────────────────────────────────────────────────────────

/// Normalized view as a polars `DataFrame`.
///
/// List fields are joined with `|` so the table stays flat.
pub fn frame_to_dataframe(frame: &MovieFrame) -> Result<DataFrame, ExportError> {
    let rows = frame.rows();

    let ids: Vec<Option<i64>> = rows.iter().map(|r| r.id).collect();
    let titles: Vec<String> = rows.iter().map(|r| r.title.clone()).collect();
    let years: Vec<Option<i32>> = rows.iter().map(|r| r.year).collect();
    let budgets: Vec<f64> = rows.iter().map(|r| r.budget).collect();
    let revenues: Vec<f64> = rows.iter().map(|r| r.revenue).collect();
    let rois: Vec<f64> = rows.iter().map(|r| r.roi).collect();
    let ratings: Vec<f64> = rows.iter().map(|r| r.vote_average).collect();
    let popularity: Vec<f64> = rows.iter().map(|r| r.popularity).collect();
    let genres: Vec<String> = rows
        .iter()
        .map(|r| {
            r.genre_ids
                .iter()
                .map(|id| crate::domain::genre_name(*id).into_owned())
                .collect::<Vec<_>>()
                .join("|")
        })
        .collect();
    let countries: Vec<String> = rows.iter().map(|r| r.countries.join("|")).collect();

    DataFrame::new(vec![
        Column::new("id".into(), ids),
        Column::new("title".into(), titles),
        Column::new("year".into(), years),
        Column::new("budget".into(), budgets),
        Column::new("revenue".into(), revenues),
        Column::new("roi".into(), rois),
        Column::new("vote_average".into(), ratings),
        Column::new("popularity".into(), popularity),
        Column::new("genres".into(), genres),
        Column::new("countries".into(), countries),
    ])
    .map_err(|e| ExportError::Parquet(format!("dataframe creation: {e}")))
}

/// Write the view to a Parquet file (write to .tmp, then rename).
pub fn write_parquet(frame: &MovieFrame, path: &Path) -> Result<usize, ExportError> {
    let mut df = frame_to_dataframe(frame)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    let file = fs::File::create(&tmp)?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .map_err(|e| ExportError::Parquet(format!("write parquet: {e}")))?;

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        ExportError::Io(e)
    })?;

    Ok(df.height())
}

// ── CSV ─────────────────────────────────────────────────────────────

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let data = wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))?;
    Ok(String::from_utf8(data)?)
}

/// Columns: year, genre, count
pub fn genres_csv(counts: &[GenreYearCount]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["year", "genre", "count"])?;
    for c in counts {
        wtr.write_record([c.year.to_string(), c.genre.clone(), c.count.to_string()])?;
    }
    finish(wtr)
}

/// Columns: country, movie_count
pub fn countries_csv(countries: &[CountryCount]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["country", "movie_count"])?;
    for c in countries {
        wtr.write_record([c.country.clone(), c.movie_count.to_string()])?;
    }
    finish(wtr)
}

/// Columns: title, budget, revenue, roi, year, vote_average
pub fn roi_csv(entries: &[RoiEntry]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["title", "budget", "revenue", "roi", "year", "vote_average"])?;
    for e in entries {
        wtr.write_record([
            e.title.clone(),
            format!("{:.0}", e.budget),
            format!("{:.0}", e.revenue),
            format!("{:.2}", e.roi),
            e.year.map(|y| y.to_string()).unwrap_or_default(),
            format!("{:.1}", e.vote_average),
        ])?;
    }
    finish(wtr)
}

/// Columns: country, total_budget, movie_count, avg_budget
pub fn spending_csv(spending: &[CountrySpending]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["country", "total_budget", "movie_count", "avg_budget"])?;
    for s in spending {
        wtr.write_record([
            s.country.clone(),
            format!("{:.0}", s.total_budget),
            s.movie_count.to_string(),
            format!("{:.2}", s.avg_budget),
        ])?;
    }
    finish(wtr)
}
