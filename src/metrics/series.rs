// Copyright 2025 Cowboy AI, LLC.

//! Per-second throughput series and outcome totals

use super::window::{CreatedSample, OutcomeSample};
use crate::events::EpochMillis;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of points in the line series, one per second
pub const SERIES_POINTS: usize = 60;

const BUCKET_MS: i64 = 1_000;

/// One second of the created-orders series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePoint {
    /// Point time (`now - i * 1000`)
    pub at: EpochMillis,
    /// `MM:SS` in UTC
    pub label: String,
    /// Created samples whose second bucket matches this point
    pub count: usize,
}

fn bucket_of(at: EpochMillis) -> EpochMillis {
    at.div_euclid(BUCKET_MS) * BUCKET_MS
}

fn format_label(at: EpochMillis) -> String {
    DateTime::from_timestamp_millis(at)
        .map(|dt| dt.format("%M:%S").to_string())
        .unwrap_or_default()
}

/// Bucket created samples into the 60 seconds ending at `now`, oldest first
pub fn build_line_series(now: EpochMillis, created: &[CreatedSample]) -> Vec<LinePoint> {
    let mut buckets: HashMap<EpochMillis, usize> = HashMap::new();
    for sample in created {
        *buckets.entry(bucket_of(sample.at)).or_insert(0) += 1;
    }

    (0..SERIES_POINTS as i64)
        .rev()
        .map(|i| {
            let at = now.saturating_sub(i * BUCKET_MS);
            LinePoint {
                at,
                label: format_label(at),
                count: buckets.get(&bucket_of(at)).copied().unwrap_or(0),
            }
        })
        .collect()
}

/// Success and failure totals over the outcome window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSeries {
    /// Authorized payments
    pub success: usize,
    /// Failed payments
    pub failure: usize,
}

impl OutcomeSeries {
    /// Count outcomes
    pub fn from_samples(outcomes: &[OutcomeSample]) -> Self {
        let success = outcomes.iter().filter(|s| s.ok).count();
        Self {
            success,
            failure: outcomes.len() - success,
        }
    }
}
