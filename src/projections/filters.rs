// Copyright 2025 Cowboy AI, LLC.

//! Order list filters

use crate::events::EpochMillis;
use crate::orders::{OrderAggregate, OrderStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named filter over the order list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "id", rename_all = "snake_case")]
pub enum OrdersFilter {
    /// Every order
    All,
    /// Orders whose payment failed
    Failed,
    /// Created orders older than the threshold
    PaymentStuck {
        /// Pending threshold
        threshold_ms: i64,
    },
    /// Authorized orders idle longer than the threshold
    ShippingAtRisk {
        /// Idle threshold
        threshold_ms: i64,
    },
    /// An explicit set of recently failed orders
    FailedRecent {
        /// Order ids to keep
        order_ids: Vec<String>,
    },
}

impl OrdersFilter {
    /// Whether `order` passes this filter at `now`
    pub fn matches(&self, order: &OrderAggregate, now: EpochMillis) -> bool {
        match self {
            OrdersFilter::All => true,
            OrdersFilter::Failed => order.current_status == OrderStatus::Failed,
            OrdersFilter::PaymentStuck { threshold_ms } => {
                order.current_status == OrderStatus::Created
                    && now.saturating_sub(order.created_at) > *threshold_ms
            }
            OrdersFilter::ShippingAtRisk { threshold_ms } => {
                order.current_status == OrderStatus::Authorized
                    && now.saturating_sub(order.updated_at) > *threshold_ms
            }
            OrdersFilter::FailedRecent { order_ids } => order_ids.contains(&order.order_id),
        }
    }
}

/// Keep the orders that pass `filter`, preserving input order
pub fn apply_orders_filter<'a>(
    orders: impl IntoIterator<Item = &'a OrderAggregate>,
    filter: &OrdersFilter,
    now: EpochMillis,
) -> Vec<&'a OrderAggregate> {
    if let OrdersFilter::FailedRecent { order_ids } = filter {
        let wanted: HashSet<&str> = order_ids.iter().map(String::as_str).collect();
        return orders
            .into_iter()
            .filter(|o| wanted.contains(o.order_id.as_str()))
            .collect();
    }
    orders
        .into_iter()
        .filter(|o| filter.matches(o, now))
        .collect()
}
