//! Property tests for aggregation invariants.
//!
//! Uses proptest to verify:
//! 1. Identity filter: no year range and no rating floor keeps every row
//! 2. ROI definition: 0 without budget, percent gain otherwise
//! 3. Country ranking: at most n entries, non-increasing counts
//! 4. ROI ranking: every entry passes the predicates, sorted descending
//! 5. Spending conservation: budgets are counted once per country
//! 6. Summary: never NaN, None only for an empty view

use movielab_core::analytics::{MovieFrame, YearRange};
use movielab_core::MovieRecord;
use proptest::prelude::*;
use serde_json::{json, Value};

// ── Strategies (proptest) ────────────────────────────────────────────

const COUNTRIES: [&str; 5] = ["USA", "UK", "France", "Japan", "India"];

fn arb_money() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => (0u64..500_000_000).prop_map(|v| json!(v)),
        1 => Just(json!(0)),
        1 => Just(json!("not a number")),
        1 => Just(Value::Null),
    ]
}

fn arb_countries() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => prop::collection::vec(0usize..COUNTRIES.len(), 0..3).prop_map(|idx| {
            Value::Array(idx.into_iter().map(|i| json!({ "name": COUNTRIES[i] })).collect())
        }),
        1 => Just(json!("USA")),
    ]
}

fn arb_record() -> impl Strategy<Value = MovieRecord> {
    (
        "[a-z]{1,8}",
        prop::option::of(2000i32..2025),
        arb_money(),
        arb_money(),
        0.0..10.0_f64,
        0.0..500.0_f64,
        prop::collection::vec(prop::sample::select(vec![28i64, 12, 18, 35, 99, 4242]), 0..4),
        arb_countries(),
    )
        .prop_map(
            |(title, year, budget, revenue, rating, popularity, genres, countries)| {
                let release_date = match year {
                    Some(y) => json!(format!("{y}-06-15")),
                    None => json!("unknown"),
                };
                MovieRecord::from_value(json!({
                    "title": title,
                    "release_date": release_date,
                    "budget": budget,
                    "revenue": revenue,
                    "vote_average": rating,
                    "popularity": popularity,
                    "genre_ids": genres,
                    "production_countries": countries,
                }))
                .unwrap()
            },
        )
}

fn arb_records() -> impl Strategy<Value = Vec<MovieRecord>> {
    prop::collection::vec(arb_record(), 0..40)
}

// ── 1. Identity filter ───────────────────────────────────────────────

proptest! {
    #[test]
    fn identity_filter_keeps_every_row(records in arb_records()) {
        let frame = MovieFrame::new(&records);
        prop_assert_eq!(frame.filter(None, 0.0).rows(), frame.rows());
    }

    #[test]
    fn full_range_keeps_every_dated_row(records in arb_records()) {
        let frame = MovieFrame::new(&records);
        let dated = frame.rows().into_iter().filter(|r| r.year.is_some()).count();
        let filtered = frame.filter(Some(YearRange::new(i32::MIN, i32::MAX)), 0.0);
        prop_assert_eq!(filtered.len(), dated);
    }

    #[test]
    fn filtered_rows_satisfy_the_filter(
        records in arb_records(),
        low in 2000i32..2025,
        span in 0i32..10,
        min_rating in 0.0..10.0_f64,
    ) {
        let frame = MovieFrame::new(&records);
        let range = YearRange::new(low, low + span);
        let filtered = frame.filter(Some(range), min_rating);
        for row in filtered.rows() {
            prop_assert!(row.year.is_some_and(|y| range.contains(y)));
            prop_assert!(min_rating <= 0.0 || row.vote_average >= min_rating);
        }
        prop_assert_eq!(frame.len(), records.len());
    }
}

// ── 2. ROI definition ────────────────────────────────────────────────

proptest! {
    #[test]
    fn roi_matches_definition(records in arb_records()) {
        for row in MovieFrame::new(&records).rows() {
            if row.budget == 0.0 {
                prop_assert_eq!(row.roi, 0.0);
            } else {
                let expected = (row.revenue - row.budget) / row.budget * 100.0;
                prop_assert!((row.roi - expected).abs() < 1e-9);
            }
            prop_assert!(row.roi.is_finite());
        }
    }
}

// ── 3 & 4. Rankings ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn country_ranking_is_bounded_and_sorted(records in arb_records(), n in 0usize..8) {
        let top = MovieFrame::new(&records).top_producing_countries(n);
        prop_assert!(top.len() <= n);
        for pair in top.windows(2) {
            prop_assert!(pair[0].movie_count >= pair[1].movie_count);
        }
    }

    #[test]
    fn roi_ranking_respects_predicates(
        records in arb_records(),
        min_budget in 0.0..200_000_000.0_f64,
        n in 0usize..10,
    ) {
        let best = MovieFrame::new(&records).best_roi_movies(min_budget, n);
        prop_assert!(best.len() <= n);
        for entry in &best {
            prop_assert!(entry.budget >= min_budget);
            prop_assert!(entry.revenue > 0.0);
            prop_assert!(entry.roi > 0.0);
        }
        for pair in best.windows(2) {
            prop_assert!(pair[0].roi >= pair[1].roi);
        }
    }
}

// ── 5. Spending conservation ─────────────────────────────────────────

proptest! {
    #[test]
    fn spending_counts_budget_once_per_country(records in arb_records()) {
        let frame = MovieFrame::new(&records);
        let expected: f64 = frame
            .rows()
            .iter()
            .filter(|r| r.budget > 0.0)
            .map(|r| r.budget * r.countries.len() as f64)
            .sum();
        let total: f64 = frame
            .movie_spending_by_country(usize::MAX)
            .iter()
            .map(|s| s.total_budget)
            .sum();
        prop_assert!((total - expected).abs() <= 1e-6 * expected.max(1.0));
    }
}

// ── 6. Summary ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn summary_is_never_nan(records in arb_records(), min_rating in 0.0..10.0_f64) {
        let frame = MovieFrame::new(&records).filter(None, min_rating);
        match frame.summary_stats() {
            None => prop_assert!(frame.is_empty()),
            Some(s) => {
                prop_assert_eq!(s.total_movies, frame.len());
                prop_assert!(s.avg_rating.is_finite());
                prop_assert!(s.avg_budget.is_finite());
                prop_assert!(s.total_revenue.is_finite());
            }
        }
        prop_assert!(frame.popularity_rating_correlation().coefficient.is_finite());
    }
}
