// Copyright 2025 Cowboy AI, LLC.

//! Order status progression and derived issues

use crate::config::IssueThresholds;
use crate::events::{EpochMillis, OrderEventKind};
use crate::state_machine::{RankedState, State};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an order
///
/// Progression statuses are ordered `created < authorized < picked < shipped
/// < delivered`. `failed` and `cancelled` are terminal side-ranks placed above
/// every progression status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, payment pending
    Created,
    /// Payment authorized
    Authorized,
    /// Picked in the warehouse
    Picked,
    /// Handed to the carrier
    Shipped,
    /// Delivered to the customer
    Delivered,
    /// Payment failed
    Failed,
    /// Cancelled
    Cancelled,
}

impl OrderStatus {
    /// Candidate status for an event kind
    pub fn from_event(kind: &OrderEventKind) -> Self {
        match kind {
            OrderEventKind::Created { .. } => OrderStatus::Created,
            OrderEventKind::PaymentAuthorized { .. } => OrderStatus::Authorized,
            OrderEventKind::PaymentFailed { .. } => OrderStatus::Failed,
            OrderEventKind::Picked { .. } => OrderStatus::Picked,
            OrderEventKind::Shipped { .. } => OrderStatus::Shipped,
            OrderEventKind::Delivered { .. } => OrderStatus::Delivered,
            OrderEventKind::Cancelled { .. } => OrderStatus::Cancelled,
        }
    }

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        self.name()
    }

    /// Created, authorized or picked: not yet with the carrier
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            OrderStatus::Created | OrderStatus::Authorized | OrderStatus::Picked
        )
    }
}

impl State for OrderStatus {
    fn name(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Authorized => "authorized",
            OrderStatus::Picked => "picked",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Failed => "failed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Failed | OrderStatus::Cancelled)
    }
}

impl RankedState for OrderStatus {
    fn rank(&self) -> u8 {
        match self {
            OrderStatus::Created => 1,
            OrderStatus::Authorized => 2,
            OrderStatus::Picked => 3,
            OrderStatus::Shipped => 4,
            OrderStatus::Delivered => 5,
            OrderStatus::Failed => 6,
            OrderStatus::Cancelled => 7,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operational issue derived from status and elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DerivedIssue {
    /// Payment failed
    PaymentFailed,
    /// Still awaiting payment past the pending threshold
    StuckPending,
    /// Authorized or picked but idle past the shipping threshold
    ShippingDelay,
}

/// Derive the current issue for an order
pub fn derive_issue(
    status: OrderStatus,
    created_at: EpochMillis,
    updated_at: EpochMillis,
    now: EpochMillis,
    thresholds: &IssueThresholds,
) -> Option<DerivedIssue> {
    match status {
        OrderStatus::Failed => Some(DerivedIssue::PaymentFailed),
        OrderStatus::Created if now.saturating_sub(created_at) > thresholds.payment_pending_ms => {
            Some(DerivedIssue::StuckPending)
        }
        OrderStatus::Authorized | OrderStatus::Picked
            if now.saturating_sub(updated_at) > thresholds.shipping_late_ms =>
        {
            Some(DerivedIssue::ShippingDelay)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_are_strictly_increasing() {
        let ordered = [
            OrderStatus::Created,
            OrderStatus::Authorized,
            OrderStatus::Picked,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Failed,
            OrderStatus::Cancelled,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
        }
    }

    #[test]
    fn test_regression_guard() {
        assert_eq!(
            OrderStatus::Failed.advance(OrderStatus::Authorized),
            OrderStatus::Failed
        );
        assert_eq!(
            OrderStatus::Shipped.advance(OrderStatus::Picked),
            OrderStatus::Shipped
        );
        assert_eq!(
            OrderStatus::Delivered.advance(OrderStatus::Cancelled),
            OrderStatus::Cancelled
        );
        assert_eq!(
            OrderStatus::Created.advance(OrderStatus::Failed),
            OrderStatus::Failed
        );
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Failed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Delivered.is_terminal());
    }

    #[test]
    fn test_issue_derivation() {
        let t = IssueThresholds {
            payment_pending_ms: 1_000,
            shipping_late_ms: 2_000,
            failure_window_ms: 10_000,
        };
        assert_eq!(
            derive_issue(OrderStatus::Failed, 0, 0, 0, &t),
            Some(DerivedIssue::PaymentFailed)
        );
        assert_eq!(derive_issue(OrderStatus::Created, 0, 0, 1_000, &t), None);
        assert_eq!(
            derive_issue(OrderStatus::Created, 0, 0, 1_001, &t),
            Some(DerivedIssue::StuckPending)
        );
        assert_eq!(
            derive_issue(OrderStatus::Picked, 0, 500, 2_501, &t),
            Some(DerivedIssue::ShippingDelay)
        );
        assert_eq!(derive_issue(OrderStatus::Shipped, 0, 0, 99_999, &t), None);
    }

    #[test]
    fn test_issue_derivation_at_timestamp_extremes() {
        let t = IssueThresholds::default();
        assert_eq!(
            derive_issue(OrderStatus::Created, i64::MIN, i64::MIN, i64::MAX, &t),
            Some(DerivedIssue::StuckPending)
        );
        assert_eq!(
            derive_issue(OrderStatus::Authorized, 0, i64::MIN, i64::MAX, &t),
            Some(DerivedIssue::ShippingDelay)
        );
        assert_eq!(derive_issue(OrderStatus::Created, i64::MAX, 0, i64::MIN, &t), None);
        assert_eq!(derive_issue(OrderStatus::Picked, 0, i64::MAX, i64::MIN, &t), None);
    }
}
