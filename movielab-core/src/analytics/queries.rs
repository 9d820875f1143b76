//! Aggregation queries over a `MovieFrame`.
//!
//! All queries are read-only. Rankings are stable: ties keep the order in
//! which keys (countries, movies) were first encountered in the view.

use super::frame::MovieFrame;
use super::stats::pearson;
use crate::domain::genre_name;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Movies per (year, genre).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreYearCount {
    pub year: i32,
    pub genre: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCount {
    pub country: String,
    pub movie_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiEntry {
    pub title: String,
    pub budget: f64,
    pub revenue: f64,
    pub roi: f64,
    pub year: Option<i32>,
    pub vote_average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountrySpending {
    pub country: String,
    pub total_budget: f64,
    pub movie_count: usize,
    pub avg_budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPoint {
    pub title: String,
    pub popularity: f64,
    pub vote_average: f64,
    pub year: Option<i32>,
}

/// Popularity vs. rating sample and its Pearson coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub points: Vec<CorrelationPoint>,
    pub coefficient: f64,
}

/// Insertion-ordered tally keyed by string.
struct OrderedTally<V> {
    index: HashMap<String, usize>,
    entries: Vec<(String, V)>,
}

impl<V: Default> OrderedTally<V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn entry(&mut self, key: &str) -> &mut V {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.entries.push((key.to_string(), V::default()));
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[slot].1
    }

    fn into_entries(self) -> Vec<(String, V)> {
        self.entries
    }
}

impl MovieFrame {
    /// Count of movies per (year, genre), ordered by year then genre name.
    ///
    /// Rows without a year or without genres contribute nothing. No
    /// truncation; see [`top_genres`] for the usual top-N post-filter.
    pub fn genre_frequency_by_year(&self) -> Vec<GenreYearCount> {
        let store = self.store();
        let mut counts: BTreeMap<(i32, String), usize> = BTreeMap::new();

        for i in self.iter() {
            let Some(year) = store.years[i] else {
                continue;
            };
            for &id in &store.genre_ids[i] {
                *counts.entry((year, genre_name(id).into_owned())).or_default() += 1;
            }
        }

        counts
            .into_iter()
            .map(|((year, genre), count)| GenreYearCount { year, genre, count })
            .collect()
    }

    /// Countries by number of movies, most first, at most `n`.
    pub fn top_producing_countries(&self, n: usize) -> Vec<CountryCount> {
        let store = self.store();
        let mut tally: OrderedTally<usize> = OrderedTally::new();

        for i in self.iter() {
            for country in &store.countries[i] {
                *tally.entry(country) += 1;
            }
        }

        let mut ranked = tally.into_entries();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(n)
            .map(|(country, movie_count)| CountryCount {
                country,
                movie_count,
            })
            .collect()
    }

    /// Profitable movies with at least `min_budget`, highest ROI first.
    pub fn best_roi_movies(&self, min_budget: f64, n: usize) -> Vec<RoiEntry> {
        let store = self.store();
        let mut picked: Vec<usize> = self
            .iter()
            .filter(|&i| {
                store.budgets[i] >= min_budget && store.revenues[i] > 0.0 && store.rois[i] > 0.0
            })
            .collect();

        picked.sort_by(|&a, &b| store.rois[b].total_cmp(&store.rois[a]));
        picked
            .into_iter()
            .take(n)
            .map(|i| RoiEntry {
                title: store.titles[i].clone(),
                budget: store.budgets[i],
                revenue: store.revenues[i],
                roi: store.rois[i],
                year: store.years[i],
                vote_average: store.ratings[i],
            })
            .collect()
    }

    /// Total and average budget per production country, largest total first.
    ///
    /// A movie with several countries adds its full budget to each of them.
    pub fn movie_spending_by_country(&self, n: usize) -> Vec<CountrySpending> {
        let store = self.store();
        let mut tally: OrderedTally<(f64, usize)> = OrderedTally::new();

        for i in self.iter() {
            let budget = store.budgets[i];
            if budget <= 0.0 {
                continue;
            }
            for country in &store.countries[i] {
                let slot = tally.entry(country);
                slot.0 += budget;
                slot.1 += 1;
            }
        }

        let mut ranked: Vec<CountrySpending> = tally
            .into_entries()
            .into_iter()
            .map(|(country, (total_budget, movie_count))| CountrySpending {
                avg_budget: if movie_count > 0 {
                    total_budget / movie_count as f64
                } else {
                    0.0
                },
                country,
                total_budget,
                movie_count,
            })
            .collect();

        ranked.sort_by(|a, b| b.total_budget.total_cmp(&a.total_budget));
        ranked.truncate(n);
        ranked
    }

    /// Pearson correlation of popularity and rating over rows where both are
    /// positive. An empty sample yields no points and a coefficient of 0.
    pub fn popularity_rating_correlation(&self) -> Correlation {
        let store = self.store();
        let picked: Vec<usize> = self
            .iter()
            .filter(|&i| store.popularity[i] > 0.0 && store.ratings[i] > 0.0)
            .collect();

        if picked.is_empty() {
            return Correlation {
                points: Vec::new(),
                coefficient: 0.0,
            };
        }

        let xs: Vec<f64> = picked.iter().map(|&i| store.popularity[i]).collect();
        let ys: Vec<f64> = picked.iter().map(|&i| store.ratings[i]).collect();

        Correlation {
            coefficient: pearson(&xs, &ys),
            points: picked
                .into_iter()
                .map(|i| CorrelationPoint {
                    title: store.titles[i].clone(),
                    popularity: store.popularity[i],
                    vote_average: store.ratings[i],
                    year: store.years[i],
                })
                .collect(),
        }
    }
}

/// The `n` genres with the largest count summed over all years.
pub fn top_genres(counts: &[GenreYearCount], n: usize) -> Vec<String> {
    let mut tally: OrderedTally<usize> = OrderedTally::new();
    for c in counts {
        *tally.entry(&c.genre) += c.count;
    }
    let mut ranked = tally.into_entries();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(n).map(|(genre, _)| genre).collect()
}

/// Keep only the counts whose genre is in `genres`.
pub fn restrict_to_genres(counts: &[GenreYearCount], genres: &[String]) -> Vec<GenreYearCount> {
    let keep: HashSet<&str> = genres.iter().map(String::as_str).collect();
    counts
        .iter()
        .filter(|c| keep.contains(c.genre.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MovieRecord;
    use serde_json::{json, Value};

    fn frame(values: Vec<Value>) -> MovieFrame {
        let records: Vec<MovieRecord> = values
            .into_iter()
            .filter_map(MovieRecord::from_value)
            .collect();
        MovieFrame::new(&records)
    }

    fn countries(names: &[&str]) -> Value {
        Value::Array(names.iter().map(|n| json!({ "name": n })).collect())
    }

    #[test]
    fn genre_counts_group_by_year_and_name() {
        let f = frame(vec![
            json!({ "release_date": "2020-01-01", "genre_ids": [28, 18] }),
            json!({ "release_date": "2020-06-01", "genre_ids": [28, 99999] }),
            json!({ "release_date": "2019-06-01", "genre_ids": [18] }),
            json!({ "release_date": "bad", "genre_ids": [28] }),
            json!({ "release_date": "2019-06-01", "genre_ids": [] }),
        ]);

        let counts = f.genre_frequency_by_year();
        let flat: Vec<(i32, &str, usize)> = counts
            .iter()
            .map(|c| (c.year, c.genre.as_str(), c.count))
            .collect();
        assert_eq!(
            flat,
            vec![
                (2019, "Drama", 1),
                (2020, "Action", 2),
                (2020, "Drama", 1),
                (2020, "Genre 99999", 1),
            ]
        );
    }

    #[test]
    fn genre_counts_empty_view() {
        assert!(frame(vec![]).genre_frequency_by_year().is_empty());
    }

    #[test]
    fn top_genres_then_restrict() {
        let f = frame(vec![
            json!({ "year": 2020, "genre_ids": [28, 35] }),
            json!({ "year": 2021, "genre_ids": [28, 18] }),
            json!({ "year": 2021, "genre_ids": [18, 28] }),
        ]);
        let counts = f.genre_frequency_by_year();
        let top = top_genres(&counts, 2);
        assert_eq!(top, vec!["Action", "Drama"]);

        let kept = restrict_to_genres(&counts, &top);
        assert!(kept.iter().all(|c| c.genre != "Comedy"));
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn countries_rank_by_count_with_stable_ties() {
        let f = frame(vec![
            json!({ "production_countries": countries(&["France", "Germany"]) }),
            json!({ "production_countries": countries(&["Germany", "Spain"]) }),
            json!({ "production_countries": countries(&["Spain", "Italy"]) }),
            json!({ "production_countries": "France" }),
        ]);

        let top = f.top_producing_countries(3);
        let names: Vec<(&str, usize)> = top
            .iter()
            .map(|c| (c.country.as_str(), c.movie_count))
            .collect();
        assert_eq!(names, vec![("Germany", 2), ("Spain", 2), ("France", 1)]);
    }

    #[test]
    fn countries_empty_without_data() {
        let f = frame(vec![json!({ "title": "x" })]);
        assert!(f.top_producing_countries(5).is_empty());
        assert!(f.movie_spending_by_country(5).is_empty());
    }

    #[test]
    fn roi_ranking_applies_all_predicates() {
        let f = frame(vec![
            json!({ "title": "small", "budget": 10, "revenue": 1000 }),
            json!({ "title": "flop", "budget": 2_000_000, "revenue": 1_000_000 }),
            json!({ "title": "hit", "budget": 2_000_000, "revenue": 10_000_000 }),
            json!({ "title": "ok", "budget": 1_000_000, "revenue": 2_000_000 }),
            json!({ "title": "unknown", "budget": 5_000_000, "revenue": 0 }),
        ]);

        let best = f.best_roi_movies(1_000_000.0, 10);
        let titles: Vec<&str> = best.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["hit", "ok"]);
        assert_eq!(best[0].roi, 400.0);
        assert_eq!(best[1].roi, 100.0);

        assert_eq!(f.best_roi_movies(1_000_000.0, 1).len(), 1);
        assert!(f.best_roi_movies(1e12, 10).is_empty());
    }

    #[test]
    fn spending_double_counts_multi_country_budgets() {
        let f = frame(vec![
            json!({ "budget": 100, "production_countries": countries(&["US", "UK"]) }),
            json!({ "budget": 50, "production_countries": countries(&["UK"]) }),
            json!({ "budget": 0, "production_countries": countries(&["FR"]) }),
            json!({ "budget": "not a number", "production_countries": countries(&["DE"]) }),
        ]);

        let spending = f.movie_spending_by_country(10);
        assert_eq!(spending.len(), 2);
        assert_eq!(spending[0].country, "UK");
        assert_eq!(spending[0].total_budget, 150.0);
        assert_eq!(spending[0].movie_count, 2);
        assert_eq!(spending[0].avg_budget, 75.0);
        assert_eq!(spending[1].country, "US");
        assert_eq!(spending[1].total_budget, 100.0);

        assert_eq!(f.movie_spending_by_country(1).len(), 1);
    }

    #[test]
    fn repeated_genre_code_counts_each_time() {
        let f = frame(vec![
            json!({ "release_date": "2020-01-01", "genre_ids": [28, 28, 18] }),
            json!({ "release_date": "2020-02-01", "genre_ids": [28] }),
        ]);
        let counts = f.genre_frequency_by_year();
        assert_eq!(
            counts,
            vec![
                GenreYearCount { year: 2020, genre: "Action".into(), count: 3 },
                GenreYearCount { year: 2020, genre: "Drama".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn spending_ties_keep_first_seen_order() {
        let f = frame(vec![
            json!({ "budget": 10, "production_countries": countries(&["Peru"]) }),
            json!({ "budget": 30, "production_countries": countries(&["Chile", "Brazil"]) }),
            json!({ "budget": 20, "production_countries": countries(&["Peru"]) }),
            json!({ "budget": 5, "production_countries": countries(&["Argentina"]) }),
        ]);
        // Peru, Chile and Brazil all total 30
        let spending = f.movie_spending_by_country(10);
        let order: Vec<&str> = spending.iter().map(|s| s.country.as_str()).collect();
        assert_eq!(order, vec!["Peru", "Chile", "Brazil", "Argentina"]);
        assert_eq!(spending[0].movie_count, 2);
        assert_eq!(spending[0].avg_budget, 15.0);
    }

    #[test]
    fn equal_roi_keeps_view_order() {
        let f = frame(vec![
            json!({ "title": "first", "budget": 100, "revenue": 300 }),
            json!({ "title": "best", "budget": 100, "revenue": 900 }),
            json!({ "title": "second", "budget": 200, "revenue": 600 }),
            json!({ "title": "third", "budget": 50, "revenue": 150 }),
        ]);
        let titles: Vec<String> = f
            .best_roi_movies(0.0, 10)
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["best", "first", "second", "third"]);

        let dropped_first = f.filter(None, 0.0).best_roi_movies(150.0, 10);
        assert_eq!(dropped_first.len(), 1);
        assert_eq!(dropped_first[0].title, "second");
    }

    #[test]
    fn correlation_uses_only_positive_pairs() {
        let f = frame(vec![
            json!({ "title": "a", "popularity": 1.0, "vote_average": 5.0 }),
            json!({ "title": "b", "popularity": 2.0, "vote_average": 6.0 }),
            json!({ "title": "c", "popularity": 3.0, "vote_average": 7.0 }),
            json!({ "title": "d", "popularity": 0.0, "vote_average": 1.0 }),
            json!({ "title": "e", "popularity": 9.0, "vote_average": 0.0 }),
        ]);

        let corr = f.popularity_rating_correlation();
        assert_eq!(corr.points.len(), 3);
        assert!((corr.coefficient - 1.0).abs() < 1e-12);
    }

    #[test]
    fn correlation_of_empty_view() {
        let corr = frame(vec![json!({ "popularity": 0 })]).popularity_rating_correlation();
        assert!(corr.points.is_empty());
        assert_eq!(corr.coefficient, 0.0);
    }

    #[test]
    fn correlation_of_single_point_is_zero() {
        let corr = frame(vec![json!({ "popularity": 4.0, "vote_average": 6.5 })])
            .popularity_rating_correlation();
        assert_eq!(corr.points.len(), 1);
        assert_eq!(corr.coefficient, 0.0);
    }
}
