// Copyright 2025 Cowboy AI, LLC.

//! Read-side selectors over the domain store

use super::{OrderAggregate, OrderStatus, OrdersDomainStore};
use crate::events::OrderStreamEvent;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Default number of orders returned by [`select_orders`]
pub const DEFAULT_ORDER_LIMIT: usize = 50;

/// Most recently updated orders, newest first
pub fn select_orders(store: &OrdersDomainStore, limit: usize) -> Vec<&OrderAggregate> {
    let mut orders: Vec<&OrderAggregate> = store.orders().collect();
    orders.sort_by_key(|o| Reverse(o.updated_at));
    orders.truncate(limit);
    orders
}

/// One order's timeline, newest first (`seq` desc, then `ts` desc)
pub fn select_order_timeline<'a>(
    store: &'a OrdersDomainStore,
    order_id: Option<&str>,
) -> Vec<&'a OrderStreamEvent> {
    let Some(order_id) = order_id else {
        return Vec::new();
    };
    let mut timeline: Vec<&OrderStreamEvent> = store.timeline(order_id).iter().collect();
    timeline.sort_by_key(|e| Reverse((e.envelope.seq, e.envelope.ts)));
    timeline
}

/// Order counts by coarse status bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// All orders
    pub total: usize,
    /// Payment failed
    pub failed: usize,
    /// Created, authorized or picked
    pub pending: usize,
    /// Shipped
    pub shipped: usize,
    /// Delivered
    pub delivered: usize,
}

/// Count orders per status bucket
pub fn count_by_status<'a>(orders: impl IntoIterator<Item = &'a OrderAggregate>) -> StatusCounts {
    orders
        .into_iter()
        .fold(StatusCounts::default(), |mut counts, order| {
            counts.total += 1;
            match order.current_status {
                OrderStatus::Failed => counts.failed += 1,
                OrderStatus::Shipped => counts.shipped += 1,
                OrderStatus::Delivered => counts.delivered += 1,
                status if status.is_pending() => counts.pending += 1,
                _ => {}
            }
            counts
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::events::{Envelope, EventType, OrderEventKind, StreamEvent};

    fn event(id: &str, order: &str, seq: u64, kind: OrderEventKind) -> StreamEvent {
        let at = kind.occurred_at();
        StreamEvent::Order(OrderStreamEvent::new(Envelope::new(id, at, seq), order, kind))
    }

    fn store() -> OrdersDomainStore {
        let config = EngineConfig::default();
        let mut store = OrdersDomainStore::new(&config);
        let events = [
            event("e1", "ord_a", 1, OrderEventKind::Picked { picked_at: 100 }),
            event("e2", "ord_b", 2, OrderEventKind::Shipped { shipped_at: 300 }),
            event(
                "e3",
                "ord_c",
                3,
                OrderEventKind::PaymentFailed {
                    failed_at: 200,
                    reason: "card_declined".into(),
                },
            ),
            event("e4", "ord_a", 4, OrderEventKind::Delivered { delivered_at: 50 }),
        ];
        for e in &events {
            store.apply(e, 400, &config);
        }
        store
    }

    #[test]
    fn test_select_orders_newest_first_with_limit() {
        let store = store();
        let ids: Vec<&str> = select_orders(&store, 2)
            .into_iter()
            .map(|o| o.order_id.as_str())
            .collect();
        assert_eq!(ids, vec!["ord_b", "ord_c"]);
    }

    #[test]
    fn test_timeline_newest_first() {
        let store = store();
        let types: Vec<EventType> = select_order_timeline(&store, Some("ord_a"))
            .into_iter()
            .map(|e| e.event_type())
            .collect();
        assert_eq!(types, vec![EventType::OrderDelivered, EventType::OrderPicked]);
        assert!(select_order_timeline(&store, None).is_empty());
    }

    #[test]
    fn test_status_counts() {
        let store = store();
        let counts = count_by_status(store.orders());
        assert_eq!(
            counts,
            StatusCounts {
                total: 3,
                failed: 1,
                pending: 0,
                shipped: 1,
                delivered: 1,
            }
        );
    }
}
