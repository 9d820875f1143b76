//! MovieLab CLI: fetch, report, export, and cache management commands.
//!
//! Commands:
//! - `fetch`: pull a year range from TMDB and cache it as JSON
//! - `report`: aggregate a cached (or freshly fetched) range and print it
//! - `export`: write the normalized movie table to Parquet
//! - `cache status`: list cached year ranges
//! - `cache clear`: remove every cached range

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};

use movielab_core::analytics::{
    restrict_to_genres, top_genres, Correlation, CountryCount, CountrySpending, GenreYearCount,
    MovieFrame, RoiEntry, SummaryStats, YearRange,
};
use movielab_core::config::{MovieLabConfig, API_KEY_ENV};
use movielab_core::data::{
    CacheKey, CacheStore, Catalog, CatalogFetcher, JsonFileCache, LogProgress, RecordSource,
    TmdbClient,
};
use movielab_core::export::{countries_csv, genres_csv, roi_csv, spending_csv, write_parquet};
use movielab_core::MovieRecord;

#[derive(Parser)]
#[command(
    name = "movielab",
    about = "MovieLab CLI: TMDB catalog fetcher and movie analytics"
)]
struct Cli {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cache directory. Overrides `cache.dir` from the config.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a year range from TMDB and cache it.
    Fetch {
        /// First release year. Defaults to `fetch.start_year`.
        #[arg(long)]
        start: Option<i32>,

        /// Last release year. Defaults to `fetch.end_year`.
        #[arg(long)]
        end: Option<i32>,

        /// Discover pages requested per year.
        #[arg(long)]
        max_pages: Option<u32>,

        /// Re-fetch even if the range is cached.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Aggregate a year range and print the report.
    Report {
        /// First release year of the loaded range.
        #[arg(long)]
        start: Option<i32>,

        /// Last release year of the loaded range.
        #[arg(long)]
        end: Option<i32>,

        /// Lower bound of the year filter.
        #[arg(long, requires = "to")]
        from: Option<i32>,

        /// Upper bound of the year filter.
        #[arg(long, requires = "from")]
        to: Option<i32>,

        /// Minimum vote average (0 disables the filter).
        #[arg(long, default_value_t = 0.0)]
        min_rating: f64,

        /// Rows per ranking. Defaults to `report.top_n`.
        #[arg(long)]
        top: Option<usize>,

        /// Offline mode: use the cache only, never the network.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Print the report as JSON instead of tables.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also write each table as CSV into this directory.
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },
    /// Write the normalized movie table to a Parquet file.
    Export {
        /// Output file.
        #[arg(long)]
        out: PathBuf,

        #[arg(long)]
        start: Option<i32>,

        #[arg(long)]
        end: Option<i32>,

        /// Offline mode: use the cache only, never the network.
        #[arg(long, default_value_t = false)]
        offline: bool,
    },
    /// Cache management commands.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached year ranges.
    Status,
    /// Remove every cached range.
    Clear {
        /// Actually delete (without this flag, only previews what would be removed).
        #[arg(long, default_value_t = false)]
        confirm: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(dir) = cli.cache_dir {
        config.cache.dir = dir;
    }

    match cli.command {
        Commands::Fetch {
            start,
            end,
            max_pages,
            force,
        } => run_fetch(&config, start, end, max_pages, force),
        Commands::Report {
            start,
            end,
            from,
            to,
            min_rating,
            top,
            offline,
            json,
            csv_dir,
        } => {
            let opts = ReportOptions {
                year_range: from.zip(to).map(|(low, high)| YearRange::new(low, high)),
                min_rating,
                top_n: top.unwrap_or(config.report.top_n),
                json,
                csv_dir,
            };
            run_report(&config, start, end, offline, &opts)
        }
        Commands::Export {
            out,
            start,
            end,
            offline,
        } => run_export(&config, start, end, offline, &out),
        Commands::Cache { action } => match action {
            CacheAction::Status => run_cache_status(&config),
            CacheAction::Clear { confirm } => run_cache_clear(&config, confirm),
        },
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<MovieLabConfig> {
    match path {
        Some(path) => MovieLabConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(MovieLabConfig::default()),
    }
}

fn year_range(config: &MovieLabConfig, start: Option<i32>, end: Option<i32>) -> Result<CacheKey> {
    let start = start.unwrap_or(config.fetch.start_year);
    let end = end.unwrap_or(config.fetch.end_year);
    if start > end {
        bail!("start year {start} is after end year {end}");
    }
    Ok(CacheKey::new(start, end))
}

fn build_catalog(
    config: &MovieLabConfig,
    max_pages: Option<u32>,
) -> Result<Catalog<TmdbClient, JsonFileCache>> {
    let Some(api_key) = config.api_key() else {
        bail!("no TMDB API key: set api.api_key in the config or ${API_KEY_ENV}");
    };
    let client = TmdbClient::with_settings(&config.api.base_url, api_key, config.timeout())
        .context("building TMDB client")?;
    let fetcher = CatalogFetcher::new(client)
        .with_page_delay(config.page_delay())
        .with_progress(Box::new(LogProgress));
    Ok(Catalog::new(fetcher, JsonFileCache::new(&config.cache.dir))
        .with_max_pages_per_year(max_pages.unwrap_or(config.fetch.max_pages_per_year)))
}

/// Non-empty cached records for `key`. Read failures count as a miss.
fn cached_movies(config: &MovieLabConfig, key: CacheKey) -> Option<Vec<MovieRecord>> {
    let cache = JsonFileCache::new(&config.cache.dir);
    match cache.load(key) {
        Ok(records) => records.filter(|r| !r.is_empty()),
        Err(e) => {
            warn!(key = %key, "cache read failed, treating as miss: {e}");
            None
        }
    }
}

/// Records for `key` from the cache; on a miss, fetched unless offline.
///
/// The API key is only required when the network is actually needed.
fn load_movies(config: &MovieLabConfig, key: CacheKey, offline: bool) -> Result<Vec<MovieRecord>> {
    if let Some(records) = cached_movies(config, key) {
        info!(key = %key, movies = records.len(), "loaded movies from cache");
        return Ok(records);
    }
    if offline {
        bail!(
            "offline mode: no cached movies for {key} in {}",
            config.cache.dir.display()
        );
    }
    let loaded = build_catalog(config, None)?.get_or_fetch(key.start_year, key.end_year);
    Ok(loaded.records)
}

fn run_fetch(
    config: &MovieLabConfig,
    start: Option<i32>,
    end: Option<i32>,
    max_pages: Option<u32>,
    force: bool,
) -> Result<()> {
    let key = year_range(config, start, end)?;

    if !force {
        if let Some(records) = cached_movies(config, key) {
            println!("{} movies for {key} ({:?})", records.len(), RecordSource::Cache);
            return Ok(());
        }
    }

    let catalog = build_catalog(config, max_pages)?;
    let loaded = catalog.force_refresh(key.start_year, key.end_year);

    if loaded.records.is_empty() {
        bail!("no movies fetched for {key}");
    }
    println!(
        "{} movies for {key} ({:?})",
        loaded.records.len(),
        loaded.source
    );
    Ok(())
}

struct ReportOptions {
    year_range: Option<YearRange>,
    min_rating: f64,
    top_n: usize,
    json: bool,
    csv_dir: Option<PathBuf>,
}

/// Everything the report prints, in one serializable value.
#[derive(Serialize)]
struct Report {
    summary: Option<SummaryStats>,
    genres_by_year: Vec<GenreYearCount>,
    top_countries: Vec<CountryCount>,
    best_roi: Vec<RoiEntry>,
    spending_by_country: Vec<CountrySpending>,
    popularity_rating: Correlation,
}

impl Report {
    fn build(frame: &MovieFrame, config: &MovieLabConfig, top_n: usize) -> Self {
        let counts = frame.genre_frequency_by_year();
        let top = top_genres(&counts, config.report.top_genres);
        Self {
            summary: frame.summary_stats(),
            genres_by_year: restrict_to_genres(&counts, &top),
            top_countries: frame.top_producing_countries(top_n),
            best_roi: frame.best_roi_movies(config.report.min_budget, top_n),
            spending_by_country: frame.movie_spending_by_country(top_n),
            popularity_rating: frame.popularity_rating_correlation(),
        }
    }
}

fn run_report(
    config: &MovieLabConfig,
    start: Option<i32>,
    end: Option<i32>,
    offline: bool,
    opts: &ReportOptions,
) -> Result<()> {
    let key = year_range(config, start, end)?;
    let records = load_movies(config, key, offline)?;
    if records.is_empty() {
        bail!("no movies available for {key}");
    }

    let frame = MovieFrame::new(&records).filter(opts.year_range, opts.min_rating);
    let report = Report::build(&frame, config, opts.top_n);

    if let Some(dir) = &opts.csv_dir {
        write_report_csv(&report, dir)?;
        println!("CSV tables written to: {}", dir.display());
    }

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn write_report_csv(report: &Report, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let tables = [
        ("genres_by_year.csv", genres_csv(&report.genres_by_year)?),
        ("top_countries.csv", countries_csv(&report.top_countries)?),
        ("best_roi.csv", roi_csv(&report.best_roi)?),
        ("spending_by_country.csv", spending_csv(&report.spending_by_country)?),
    ];
    for (name, content) in tables {
        let path = dir.join(name);
        std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn print_report(report: &Report) {
    let Some(summary) = &report.summary else {
        println!("No movies match the current filters.");
        return;
    };

    println!();
    println!("=== Movie Report ===");
    println!("Movies:         {}", summary.total_movies);
    println!("Years:          {}", summary.years_range);
    println!("Avg Rating:     {:.2}", summary.avg_rating);
    println!("Total Revenue:  {}", format_money(summary.total_revenue));
    println!("Avg Budget:     {}", format_money(summary.avg_budget));
    println!("Top Genre:      {}", summary.top_genre);

    println!();
    println!("--- Genres by Year ---");
    println!("{:<6} {:<20} {:>6}", "Year", "Genre", "Movies");
    println!("{}", "-".repeat(34));
    for c in &report.genres_by_year {
        println!("{:<6} {:<20} {:>6}", c.year, c.genre, c.count);
    }

    println!();
    println!("--- Top Producing Countries ---");
    for (rank, c) in report.top_countries.iter().enumerate() {
        println!("{:>3}. {:<32} {:>6}", rank + 1, c.country, c.movie_count);
    }

    println!();
    println!("--- Best ROI ---");
    println!(
        "{:<36} {:>6} {:>12} {:>12} {:>10}",
        "Title", "Year", "Budget", "Revenue", "ROI"
    );
    println!("{}", "-".repeat(80));
    for e in &report.best_roi {
        let year = e.year.map(|y| y.to_string()).unwrap_or_default();
        println!(
            "{:<36} {:>6} {:>12} {:>12} {:>9.1}%",
            truncate(&e.title, 36),
            year,
            format_money(e.budget),
            format_money(e.revenue),
            e.roi
        );
    }

    println!();
    println!("--- Budget by Country ---");
    println!(
        "{:<32} {:>12} {:>6} {:>12}",
        "Country", "Total", "Movies", "Average"
    );
    println!("{}", "-".repeat(65));
    for s in &report.spending_by_country {
        println!(
            "{:<32} {:>12} {:>6} {:>12}",
            truncate(&s.country, 32),
            format_money(s.total_budget),
            s.movie_count,
            format_money(s.avg_budget)
        );
    }

    println!();
    println!(
        "Popularity vs. rating: r = {:.3} over {} movies",
        report.popularity_rating.coefficient,
        report.popularity_rating.points.len()
    );
    println!();
}

fn run_export(
    config: &MovieLabConfig,
    start: Option<i32>,
    end: Option<i32>,
    offline: bool,
    out: &Path,
) -> Result<()> {
    let key = year_range(config, start, end)?;
    let records = load_movies(config, key, offline)?;
    let frame = MovieFrame::new(&records);
    let rows = write_parquet(&frame, out).with_context(|| format!("writing {}", out.display()))?;
    println!("Wrote {rows} movies to {}", out.display());
    Ok(())
}

fn run_cache_status(config: &MovieLabConfig) -> Result<()> {
    let cache = JsonFileCache::new(&config.cache.dir);
    let entries = cache.status().context("reading cache directory")?;

    if entries.is_empty() {
        println!("Cache is empty: {}", cache.cache_dir().display());
        return Ok(());
    }

    println!("Cache: {}", cache.cache_dir().display());
    println!("Ranges: {}", entries.len());
    println!();
    println!("{:<12} {:>8} {:<20} {:<16}", "Years", "Movies", "Cached At", "Hash");
    println!("{}", "-".repeat(60));
    for meta in &entries {
        println!(
            "{:<12} {:>8} {:<20} {:<16}",
            meta.key().to_string(),
            meta.record_count,
            meta.cached_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            truncate(&meta.data_hash, 16)
        );
    }
    Ok(())
}

fn run_cache_clear(config: &MovieLabConfig, confirm: bool) -> Result<()> {
    let cache = JsonFileCache::new(&config.cache.dir);
    let entries = cache.status().context("reading cache directory")?;

    if entries.is_empty() {
        println!("Cache is empty: {}", cache.cache_dir().display());
        return Ok(());
    }

    println!("Found {} cached range(s):", entries.len());
    for meta in &entries {
        println!("  {} ({} movies)", meta.key(), meta.record_count);
    }

    if !confirm {
        println!();
        println!("Dry run: pass --confirm to actually delete.");
        return Ok(());
    }

    let removed = cache.clear().context("clearing cache")?;
    println!("Done. Removed {removed} file(s).");
    Ok(())
}

fn format_money(amount: f64) -> String {
    let abs = amount.abs();
    if abs >= 1e9 {
        format!("${:.2}B", amount / 1e9)
    } else if abs >= 1e6 {
        format!("${:.1}M", amount / 1e6)
    } else if abs >= 1e3 {
        format!("${:.1}K", amount / 1e3)
    } else {
        format!("${amount:.0}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}
