// Copyright 2025 Cowboy AI, LLC.

//! Order aggregate and its reducer
//!
//! [`reduce_order`] folds one event into one order. It is total over the event
//! union: duplicates are filtered upstream by the store, stale statuses are
//! absorbed by the regression guard, and events for unseen orders synthesize
//! a sentinel aggregate.

use super::status::{derive_issue, DerivedIssue, OrderStatus};
use super::{UNKNOWN_CATEGORY, UNKNOWN_COUNTRY, UNKNOWN_CURRENCY, UNKNOWN_CUSTOMER};
use crate::config::EngineConfig;
use crate::events::{EpochMillis, OrderEventKind, OrderStreamEvent};
use crate::state_machine::RankedState;
use serde::{Deserialize, Serialize};

/// Materialized state of one order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAggregate {
    /// Order identifier
    pub order_id: String,
    /// Customer identifier, authoritative from `order_created`
    pub customer_id: String,
    /// Shipping country
    pub country: String,
    /// Product category
    pub category: String,
    /// Order value
    pub amount: f64,
    /// Currency code
    pub currency: String,
    /// Current lifecycle status
    pub current_status: OrderStatus,
    /// Earliest known creation time
    pub created_at: EpochMillis,
    /// Latest event time folded in
    pub updated_at: EpochMillis,
    /// Issue derived at the last fold
    pub current_issue: Option<DerivedIssue>,
    /// Event history ordered by `(seq, occurred_at)`, oldest first
    pub timeline: Vec<OrderStreamEvent>,
    /// Set once an `order_created` has supplied the attributes
    #[serde(default)]
    pub seeded: bool,
}

impl OrderAggregate {
    /// Base record for the first event seen for an order
    ///
    /// Attributes start as sentinels. Until an `order_created` arrives the
    /// creation time is the earliest occurrence time folded so far.
    fn seed(event: &OrderStreamEvent) -> Self {
        let at = event.occurred_at();
        Self {
            order_id: event.order_id.clone(),
            customer_id: UNKNOWN_CUSTOMER.to_string(),
            country: UNKNOWN_COUNTRY.to_string(),
            category: UNKNOWN_CATEGORY.to_string(),
            amount: 0.0,
            currency: UNKNOWN_CURRENCY.to_string(),
            current_status: OrderStatus::Created,
            created_at: at,
            updated_at: at,
            current_issue: None,
            timeline: Vec::new(),
            seeded: false,
        }
    }

    fn apply_attributes(&mut self, kind: &OrderEventKind) {
        if let OrderEventKind::Created {
            customer_id,
            country,
            category,
            amount,
            currency,
            created_at,
        } = kind
        {
            self.customer_id = customer_id.clone();
            self.country = country.clone();
            self.category = category.clone();
            self.amount = *amount;
            self.currency = currency.clone();
            self.created_at = *created_at;
            self.seeded = true;
        }
    }

    /// Whether the attributes are still sentinels (no `order_created` seen)
    pub fn is_placeholder(&self) -> bool {
        !self.seeded
    }

    /// Re-derive the issue against a new `now` without folding an event
    pub fn refresh_issue(&mut self, now: EpochMillis, config: &EngineConfig) {
        self.current_issue = derive_issue(
            self.current_status,
            self.created_at,
            self.updated_at,
            now,
            &config.thresholds,
        );
    }
}

fn insert_timeline_event(
    timeline: &mut Vec<OrderStreamEvent>,
    event: &OrderStreamEvent,
    cap: usize,
) {
    timeline.push(event.clone());
    timeline.sort_by_key(|e| (e.envelope.seq, e.occurred_at()));
    if timeline.len() > cap {
        let excess = timeline.len() - cap;
        timeline.drain(..excess);
    }
}

/// Fold one event into one order's aggregate state
pub fn reduce_order(
    existing: Option<&OrderAggregate>,
    event: &OrderStreamEvent,
    now: EpochMillis,
    config: &EngineConfig,
) -> OrderAggregate {
    let mut order = match existing {
        Some(order) => order.clone(),
        None => OrderAggregate::seed(event),
    };

    insert_timeline_event(&mut order.timeline, event, config.timeline_cap);

    order.updated_at = order.updated_at.max(event.occurred_at());
    if !order.seeded {
        order.created_at = order.created_at.min(event.occurred_at());
    }
    order.apply_attributes(&event.kind);

    let candidate = OrderStatus::from_event(&event.kind);
    order.current_status = order.current_status.advance(candidate);

    order.refresh_issue(now, config);
    order
}
