// Copyright 2025 Cowboy AI, LLC.

//! Operational exceptions panel

use crate::config::IssueThresholds;
use crate::events::{EpochMillis, OrderEventKind, StreamEvent};
use crate::orders::{OrderAggregate, OrderStatus};
use indexmap::IndexSet;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Kind of operational exception
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    /// Orders stuck before payment
    PaymentStuck,
    /// Orders idle after payment past the shipping threshold
    ShippingDelayed,
    /// Payment failures within the failure window
    FailureSpike,
}

impl ExceptionKind {
    /// Stable identifier of the panel entry
    pub fn id(&self) -> &'static str {
        match self {
            ExceptionKind::PaymentStuck => "exception_payment_stuck",
            ExceptionKind::ShippingDelayed => "exception_shipping_delayed",
            ExceptionKind::FailureSpike => "exception_failure_spike",
        }
    }
}

/// How loudly an exception should be surfaced
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Nothing to act on
    Info,
    /// Needs attention
    Warning,
    /// Needs action
    Danger,
}

/// One entry of the exceptions panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionItem {
    /// Stable identifier
    pub id: String,
    /// Exception kind
    pub kind: ExceptionKind,
    /// Headline
    pub title: String,
    /// Number of affected orders or events
    pub count: usize,
    /// Affected order ids, deduplicated in first-seen order
    pub order_ids: Vec<String>,
    /// Severity
    pub severity: Severity,
    /// Supporting text
    pub helper: String,
}

fn minutes(ms: i64) -> i64 {
    (ms as f64 / 60_000.0).round() as i64
}

fn severity_when(count: usize, raised: Severity) -> Severity {
    if count > 0 {
        raised
    } else {
        Severity::Info
    }
}

/// Compute the three panel entries, always in the same order
pub fn compute_exceptions<'a, O, E>(
    orders: O,
    events: E,
    now: EpochMillis,
    thresholds: &IssueThresholds,
) -> Vec<ExceptionItem>
where
    O: IntoIterator<Item = &'a OrderAggregate>,
    E: IntoIterator<Item = &'a StreamEvent>,
{
    let mut stuck = Vec::new();
    let mut delayed = Vec::new();
    for order in orders {
        match order.current_status {
            OrderStatus::Created
                if now.saturating_sub(order.created_at) > thresholds.payment_pending_ms =>
            {
                stuck.push(order.order_id.clone());
            }
            OrderStatus::Authorized | OrderStatus::Picked
                if now.saturating_sub(order.updated_at) > thresholds.shipping_late_ms =>
            {
                delayed.push(order.order_id.clone());
            }
            _ => {}
        }
    }

    let mut failure_count = 0;
    let mut failed_orders: IndexSet<String> = IndexSet::new();
    for event in events {
        let Some(order_event) = event.as_order() else {
            continue;
        };
        if let OrderEventKind::PaymentFailed { failed_at, .. } = order_event.kind {
            if now.saturating_sub(failed_at) <= thresholds.failure_window_ms {
                failure_count += 1;
                failed_orders.insert(order_event.order_id.clone());
            }
        }
    }

    vec![
        ExceptionItem {
            id: ExceptionKind::PaymentStuck.id().to_string(),
            kind: ExceptionKind::PaymentStuck,
            title: format!(
                "{} orders at checkout risk (payment pending > {} min)",
                stuck.len(),
                minutes(thresholds.payment_pending_ms)
            ),
            count: stuck.len(),
            severity: severity_when(stuck.len(), Severity::Warning),
            order_ids: stuck,
            helper: "Potential revenue loss if customers drop before payment is completed."
                .to_string(),
        },
        ExceptionItem {
            id: ExceptionKind::ShippingDelayed.id().to_string(),
            kind: ExceptionKind::ShippingDelayed,
            title: format!("{} shipments at SLA risk", delayed.len()),
            count: delayed.len(),
            severity: severity_when(delayed.len(), Severity::Danger),
            order_ids: delayed,
            helper: format!(
                "Fulfillment SLA target: {} min",
                minutes(thresholds.shipping_late_ms)
            ),
        },
        ExceptionItem {
            id: ExceptionKind::FailureSpike.id().to_string(),
            kind: ExceptionKind::FailureSpike,
            title: format!(
                "{} payment failures in the last {} minutes",
                failure_count,
                minutes(thresholds.failure_window_ms)
            ),
            count: failure_count,
            severity: severity_when(failure_count, Severity::Danger),
            order_ids: failed_orders.into_iter().collect(),
            helper: "Payment instability can directly reduce conversion and daily revenue."
                .to_string(),
        },
    ]
}
