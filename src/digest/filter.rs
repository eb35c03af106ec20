// src/digest/filter.rs
use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use serde::Serialize;

use crate::source::RawItem;

/// Open interval `(start, end)` in unix seconds. Both edges are excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// The UTC calendar day containing `now`: every second from midnight up to,
    /// but not including, the next midnight.
    pub fn calendar_day(now: DateTime<Utc>) -> Self {
        let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc().timestamp();
        Self {
            start: midnight - 1,
            end: midnight + 86_400,
        }
    }

    /// The `span` before `now`.
    pub fn trailing(now: DateTime<Utc>, span: ChronoDuration) -> Self {
        let end = now.timestamp();
        Self {
            start: end - span.num_seconds(),
            end,
        }
    }

    pub fn contains(&self, ts: i64) -> bool {
        self.start < ts && ts < self.end
    }
}

/// A post that passed the score and recency predicates, with an absolute link.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FilteredPost {
    pub score: i64,
    pub title: String,
    pub link: String,
    pub body_text: Option<String>,
    pub preview_url: Option<String>,
}

pub fn is_admissible(item: &RawItem, min_score: i64, window: TimeWindow) -> bool {
    item.score >= min_score && window.contains(item.created_at)
}

/// Join origin and path with exactly one slash.
pub fn absolute_link(origin: &str, path: &str) -> String {
    format!(
        "{}/{}",
        origin.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Keep admissible items in input order and rewrite their permalinks.
pub fn filter(
    items: &[RawItem],
    min_score: i64,
    window: TimeWindow,
    site_origin: &str,
) -> Vec<FilteredPost> {
    items
        .iter()
        .filter(|it| is_admissible(it, min_score, window))
        .map(|it| FilteredPost {
            score: it.score,
            title: it.title.clone(),
            link: absolute_link(site_origin, &it.permalink_path),
            body_text: it.body_text.clone(),
            preview_url: it.preview_url.clone(),
        })
        .collect()
}
