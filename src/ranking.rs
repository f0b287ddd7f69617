//! Feed ordering.
//!
//! Ranking only reads vote counters and creation time; it never touches the
//! ledger. `now` is passed in so the same input can be replayed exactly.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::constants::{HOT_AGE_OFFSET_HOURS, HOT_GRAVITY};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Anything that can be placed in a feed
pub trait Rankable {
    fn upvotes(&self) -> u64;
    fn downvotes(&self) -> u64;
    fn created_at(&self) -> DateTime<Utc>;

    /// Net score, may be negative
    fn score(&self) -> i64 {
        self.upvotes() as i64 - self.downvotes() as i64
    }
}

/// Feed sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortStrategy {
    New,
    Top,
    #[default]
    Hot,
}

impl SortStrategy {
    /// Interpret a `sort` query parameter; anything unrecognized is `Hot`
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(|p| p.trim().to_ascii_lowercase()).as_deref() {
            Some("new") => SortStrategy::New,
            Some("top") => SortStrategy::Top,
            _ => SortStrategy::Hot,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortStrategy::New => "new",
            SortStrategy::Top => "top",
            SortStrategy::Hot => "hot",
        }
    }
}

/// Fractional hours between `created_at` and `now`, never negative
pub fn age_hours(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - created_at).num_milliseconds();
    (millis as f64 / MILLIS_PER_HOUR).max(0.0)
}

/// `score / (age_hours + 2)^1.8`
pub fn hot_score(score: i64, created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age = age_hours(created_at, now);
    score as f64 / (age + HOT_AGE_OFFSET_HOURS).powf(HOT_GRAVITY)
}

/// Order `posts` by `strategy`, best first.
///
/// Sorting is stable: items with equal keys keep their input order.
pub fn rank<T: Rankable>(posts: Vec<T>, strategy: SortStrategy, now: DateTime<Utc>) -> Vec<T> {
    match strategy {
        SortStrategy::New => {
            let mut posts = posts;
            posts.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
            posts
        }
        SortStrategy::Top => {
            let mut posts = posts;
            posts.sort_by(|a, b| b.score().cmp(&a.score()));
            posts
        }
        SortStrategy::Hot => {
            // Score once per post; the key depends on `now`, not just the item
            let mut keyed: Vec<(f64, T)> = posts
                .into_iter()
                .map(|p| (hot_score(p.score(), p.created_at(), now), p))
                .collect();
            keyed.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
            keyed.into_iter().map(|(_, p)| p).collect()
        }
    }
}
