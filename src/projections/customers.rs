// Copyright 2025 Cowboy AI, LLC.

//! Customers derived from their orders

use crate::events::EpochMillis;
use crate::orders::OrderAggregate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Per-customer rollup of orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAggregate {
    /// Customer identifier, as carried by `order_created`
    pub customer_id: String,
    /// Country of the most recently folded order
    pub country: String,
    /// Number of orders
    pub order_count: usize,
    /// Sum of order amounts
    pub spend: f64,
    /// Latest `updated_at` across the customer's orders
    pub last_seen_at: EpochMillis,
}

/// Group orders by `customer_id`, most recently seen customer first
///
/// Orders still carrying the unknown-customer sentinel are grouped under it
/// like any other id.
pub fn derive_customers<'a>(
    orders: impl IntoIterator<Item = &'a OrderAggregate>,
) -> Vec<CustomerAggregate> {
    let mut customers: IndexMap<&str, CustomerAggregate> = IndexMap::new();

    for order in orders {
        customers
            .entry(order.customer_id.as_str())
            .and_modify(|c| {
                c.order_count += 1;
                c.spend += order.amount;
                c.last_seen_at = c.last_seen_at.max(order.updated_at);
                c.country = order.country.clone();
            })
            .or_insert_with(|| CustomerAggregate {
                customer_id: order.customer_id.clone(),
                country: order.country.clone(),
                order_count: 1,
                spend: order.amount,
                last_seen_at: order.updated_at,
            });
    }

    let mut customers: Vec<CustomerAggregate> = customers.into_values().collect();
    customers.sort_by_key(|c| Reverse(c.last_seen_at));
    customers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::events::{Envelope, OrderEventKind, OrderStreamEvent};
    use crate::orders::reduce_order;

    fn order(
        id: &str,
        customer: &str,
        country: &str,
        amount: f64,
        at: EpochMillis,
    ) -> OrderAggregate {
        let event = OrderStreamEvent::new(
            Envelope::new(format!("evt_{id}"), at, 1),
            id,
            OrderEventKind::Created {
                customer_id: customer.into(),
                country: country.into(),
                category: "Kitchen".into(),
                amount,
                currency: "USD".into(),
                created_at: at,
            },
        );
        reduce_order(None, &event, at, &EngineConfig::default())
    }

    #[test]
    fn test_customers_roll_up_orders() {
        let orders = [
            order("ord_1", "cus_a", "Poland", 10.0, 100),
            order("ord_2", "cus_b", "Italy", 5.5, 300),
            order("ord_3", "cus_a", "Austria", 20.0, 200),
        ];
        let customers = derive_customers(&orders);

        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].customer_id, "cus_b");
        let a = &customers[1];
        assert_eq!(a.order_count, 2);
        assert_eq!(a.spend, 30.0);
        assert_eq!(a.last_seen_at, 200);
        assert_eq!(a.country, "Austria");
    }

    #[test]
    fn test_no_orders_no_customers() {
        let orders: Vec<OrderAggregate> = Vec::new();
        assert!(derive_customers(&orders).is_empty());
    }
}
