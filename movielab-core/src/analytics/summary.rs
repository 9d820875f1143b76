//! Headline figures for a view.

use super::frame::MovieFrame;
use super::stats::mean;
use crate::domain::genre_name;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Marker used when a figure has no data behind it.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_movies: usize,
    /// `"{min} - {max}"`, or `"N/A"` when no row has a year.
    pub years_range: String,
    pub avg_rating: f64,
    pub total_revenue: f64,
    /// Mean over movies with a positive budget; 0 if there are none.
    pub avg_budget: f64,
    pub top_genre: String,
}

impl MovieFrame {
    /// Snapshot of the view, or `None` when it is empty.
    pub fn summary_stats(&self) -> Option<SummaryStats> {
        if self.is_empty() {
            return None;
        }
        let store = self.store();

        let years: Vec<i32> = self.iter().filter_map(|i| store.years[i]).collect();
        let years_range = match (years.iter().min(), years.iter().max()) {
            (Some(min), Some(max)) => format!("{min} - {max}"),
            _ => NOT_AVAILABLE.to_string(),
        };

        let ratings: Vec<f64> = self.iter().map(|i| store.ratings[i]).collect();
        let budgets: Vec<f64> = self
            .iter()
            .map(|i| store.budgets[i])
            .filter(|&b| b > 0.0)
            .collect();

        Some(SummaryStats {
            total_movies: self.len(),
            years_range,
            avg_rating: mean(&ratings),
            total_revenue: self.iter().map(|i| store.revenues[i]).sum(),
            avg_budget: mean(&budgets),
            top_genre: self.most_common_genre(),
        })
    }

    /// Most frequent genre code across the view; first seen wins ties.
    fn most_common_genre(&self) -> String {
        let store = self.store();
        let mut counts: HashMap<i64, usize> = HashMap::new();
        let mut order: Vec<i64> = Vec::new();

        for i in self.iter() {
            for &id in &store.genre_ids[i] {
                let count = counts.entry(id).or_insert_with(|| {
                    order.push(id);
                    0
                });
                *count += 1;
            }
        }

        let mut best: Option<(i64, usize)> = None;
        for id in order {
            let count = counts[&id];
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((id, count));
            }
        }

        best.map(|(id, _)| genre_name(id).into_owned())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MovieRecord;
    use serde_json::json;

    fn frame(values: Vec<serde_json::Value>) -> MovieFrame {
        let records: Vec<MovieRecord> = values
            .into_iter()
            .filter_map(MovieRecord::from_value)
            .collect();
        MovieFrame::new(&records)
    }

    #[test]
    fn empty_view_has_no_summary() {
        assert!(frame(vec![]).summary_stats().is_none());
        let f = frame(vec![json!({ "release_date": "2020-01-01" })]);
        assert!(f.filter(None, 9.0).summary_stats().is_none());
    }

    #[test]
    fn summary_figures() {
        let f = frame(vec![
            json!({ "release_date": "2016-01-01", "vote_average": 6.0, "revenue": 100, "budget": 40, "genre_ids": [18, 28] }),
            json!({ "release_date": "2022-01-01", "vote_average": 8.0, "revenue": 50, "budget": 0, "genre_ids": [28] }),
            json!({ "release_date": "2019-01-01", "vote_average": 7.0, "revenue": "?", "budget": 20 }),
        ]);

        let s = f.summary_stats().unwrap();
        assert_eq!(s.total_movies, 3);
        assert_eq!(s.years_range, "2016 - 2022");
        assert_eq!(s.avg_rating, 7.0);
        assert_eq!(s.total_revenue, 150.0);
        assert_eq!(s.avg_budget, 30.0);
        assert_eq!(s.top_genre, "Action");
    }

    #[test]
    fn missing_data_reports_not_available() {
        let f = frame(vec![json!({ "title": "bare" })]);
        let s = f.summary_stats().unwrap();
        assert_eq!(s.years_range, NOT_AVAILABLE);
        assert_eq!(s.top_genre, NOT_AVAILABLE);
        assert_eq!(s.avg_budget, 0.0);
        assert!(!s.avg_rating.is_nan());
    }

    #[test]
    fn genre_ties_go_to_first_seen() {
        let f = frame(vec![
            json!({ "genre_ids": [35] }),
            json!({ "genre_ids": [27, 35, 27] }),
        ]);
        // Comedy 2, Horror 2: Comedy was seen first
        assert_eq!(f.summary_stats().unwrap().top_genre, "Comedy");
    }
}
