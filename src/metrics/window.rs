// Copyright 2025 Cowboy AI, LLC.

//! Time-pruned sample windows and the metrics derived from them

use crate::events::EpochMillis;
use serde::{Deserialize, Serialize};

/// A sample with an occurrence time
pub trait Timestamped {
    /// When the sample occurred
    fn at(&self) -> EpochMillis;
}

/// An order creation observed on the stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSample {
    /// Creation time
    pub at: EpochMillis,
    /// Order value
    pub amount: f64,
    /// Order identifier
    pub order_id: String,
}

/// A payment outcome observed on the stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeSample {
    /// Outcome time
    pub at: EpochMillis,
    /// `true` for an authorization, `false` for a failure
    pub ok: bool,
    /// Order identifier
    pub order_id: String,
}

impl Timestamped for CreatedSample {
    fn at(&self) -> EpochMillis {
        self.at
    }
}

impl Timestamped for OutcomeSample {
    fn at(&self) -> EpochMillis {
        self.at
    }
}

/// Samples retained within a trailing window
///
/// Samples arrive in stream order, not time order, so pruning filters rather
/// than popping from the front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleWindow<T> {
    samples: Vec<T>,
}

impl<T> Default for SampleWindow<T> {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
        }
    }
}

impl<T: Timestamped> SampleWindow<T> {
    /// Create an empty window
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample
    pub fn push(&mut self, sample: T) {
        self.samples.push(sample);
    }

    /// Keep only samples with `now - at <= window_ms`
    pub fn prune(&mut self, now: EpochMillis, window_ms: i64) {
        self.samples.retain(|s| now.saturating_sub(s.at()) <= window_ms);
    }

    /// Retained samples in arrival order
    pub fn samples(&self) -> &[T] {
        &self.samples
    }

    /// Number of retained samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl<T: Timestamped> FromIterator<T> for SampleWindow<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

/// Throughput, order value and payment success over the window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowMetrics {
    /// Orders created within the window
    pub orders_per_minute: usize,
    /// Mean order value within the window, 0 when empty
    pub avg_order_value: f64,
    /// Share of successful payment outcomes, 0 when empty
    pub success_rate: f64,
}

impl WindowMetrics {
    /// Derive metrics from already-pruned windows
    pub fn compute(
        created: &SampleWindow<CreatedSample>,
        outcomes: &SampleWindow<OutcomeSample>,
    ) -> Self {
        let total: f64 = created.samples().iter().map(|s| s.amount).sum();
        let successes = outcomes.samples().iter().filter(|s| s.ok).count();
        let success_rate = if outcomes.is_empty() {
            0.0
        } else {
            successes as f64 / outcomes.len() as f64
        };

        Self {
            orders_per_minute: created.len(),
            avg_order_value: total / created.len().max(1) as f64,
            success_rate,
        }
    }
}
