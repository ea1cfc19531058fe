// Copyright 2025 Cowboy AI, LLC.

//! Engine configuration
//!
//! All limits the core consumes are plain values. Issue thresholds are
//! supplied by the caller and only compared against, never derived.

use crate::errors::{OrdersError, OrdersResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Thresholds used when deriving order issues and exceptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct IssueThresholds {
    /// A `created` order older than this is stuck before payment
    pub payment_pending_ms: i64,
    /// An authorized/picked order idle longer than this is at shipping risk
    pub shipping_late_ms: i64,
    /// Look-back used for the payment failure spike exception
    pub failure_window_ms: i64,
}

impl Default for IssueThresholds {
    fn default() -> Self {
        Self {
            payment_pending_ms: 2 * 60_000,
            shipping_late_ms: 5 * 60_000,
            failure_window_ms: 10 * 60_000,
        }
    }
}

/// Configuration for the dashboard engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EngineConfig {
    /// Sliding window length for created/outcome samples
    pub window_ms: i64,

    /// Maximum timeline entries kept per order
    pub timeline_cap: usize,

    /// Maximum entries in the raw event log
    pub event_log_cap: usize,

    /// Number of processed event ids retained for dedup
    pub dedup_capacity: usize,

    /// Issue derivation thresholds
    pub thresholds: IssueThresholds,

    /// Maximum hits returned by a global search
    pub max_search_hits: usize,

    /// Maximum hits returned by a single domain provider
    pub max_hits_per_provider: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_ms: 60_000,
            timeline_cap: 32,
            event_log_cap: 100,
            dedup_capacity: 400,
            thresholds: IssueThresholds::default(),
            max_search_hits: 24,
            max_hits_per_provider: 20,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON, filling omitted fields with defaults
    pub fn from_json(json: &str) -> OrdersResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// JSON Schema describing the configuration document
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(EngineConfig)
    }

    /// Reject configurations the engine cannot operate with
    pub fn validate(&self) -> OrdersResult<()> {
        if self.window_ms <= 0 {
            return Err(OrdersError::invalid_configuration(
                "window_ms must be positive",
            ));
        }
        if self.timeline_cap == 0 {
            return Err(OrdersError::invalid_configuration(
                "timeline_cap must be at least 1",
            ));
        }
        if self.dedup_capacity == 0 {
            return Err(OrdersError::invalid_configuration(
                "dedup_capacity must be at least 1",
            ));
        }
        if self.max_search_hits == 0 || self.max_hits_per_provider == 0 {
            return Err(OrdersError::invalid_configuration(
                "search hit limits must be at least 1",
            ));
        }
        let t = &self.thresholds;
        if t.payment_pending_ms < 0 || t.shipping_late_ms < 0 || t.failure_window_ms < 0 {
            return Err(OrdersError::invalid_configuration(
                "thresholds cannot be negative",
            ));
        }
        Ok(())
    }
}
