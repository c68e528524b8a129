use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub const TOP_PLAYERS: usize = 10;
pub const HISTOGRAM_BUCKETS: usize = 6;

/// Lights left on: `on - off`, floored at zero.
pub const fn currently_on(on_count: u64, off_count: u64) -> u64 {
    on_count.saturating_sub(off_count)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub currently_on: u64,
}

impl LeaderboardEntry {
    pub fn new(username: impl Into<String>, on_count: u64, off_count: u64) -> Self {
        Self {
            username: username.into(),
            currently_on: currently_on(on_count, off_count),
        }
    }
}

/// Orders entries by `currently_on` descending, ties by username ascending.
pub fn rank(entries: impl IntoIterator<Item = LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries
        .into_iter()
        .sorted_by(|a, b| {
            b.currently_on
                .cmp(&a.currently_on)
                .then_with(|| a.username.cmp(&b.username))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub from: f64,
    pub to: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Statistics {
    pub total_players: u64,
    pub average: f64,
    pub median: f64,
    pub top: u64,
    pub top_players: Vec<LeaderboardEntry>,
    pub histogram: Vec<HistogramBucket>,
}

impl Statistics {
    /// Summary of an already ranked leaderboard.
    pub fn from_ranked(ranked: &[LeaderboardEntry]) -> Self {
        if ranked.is_empty() {
            return Self::default();
        }

        let values: Vec<u64> = ranked.iter().map(|e| e.currently_on).sorted().collect();
        let total = values.len();
        let sum: u128 = values.iter().map(|&v| u128::from(v)).sum();
        let median = if total % 2 == 0 {
            (values[total / 2 - 1] as f64 + values[total / 2] as f64) / 2.0
        } else {
            values[total / 2] as f64
        };

        Self {
            total_players: total as u64,
            average: sum as f64 / total as f64,
            median,
            top: values[total - 1],
            top_players: ranked.iter().take(TOP_PLAYERS).cloned().collect(),
            histogram: histogram(&values),
        }
    }
}

// `values` must be sorted and non-empty.
fn histogram(values: &[u64]) -> Vec<HistogramBucket> {
    let min = values[0] as f64;
    let max = values[values.len() - 1] as f64;
    // A flat population has zero-width buckets and lands entirely in the first.
    let width = (max - min) / HISTOGRAM_BUCKETS as f64;
    let mut buckets: Vec<HistogramBucket> = (0..HISTOGRAM_BUCKETS)
        .map(|i| HistogramBucket {
            from: min + width * i as f64,
            to: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for value in values {
        let index = if width > 0.0 {
            (((*value as f64) - min) / width) as usize
        } else {
            0
        };
        buckets[index.min(HISTOGRAM_BUCKETS - 1)].count += 1;
    }
    buckets
}
