// Copyright 2025 Cowboy AI, LLC.

//! Daily KPI snapshot

use crate::config::IssueThresholds;
use crate::events::{EpochMillis, OrderEventKind, StreamEvent};
use crate::orders::{OrderAggregate, OrderStatus};
use serde::{Deserialize, Serialize};

const DAY_MS: i64 = 86_400_000;

/// Start of the UTC calendar day containing `now`
pub fn start_of_utc_day(now: EpochMillis) -> EpochMillis {
    now.saturating_sub(now.rem_euclid(DAY_MS))
}

/// Headline numbers for the current UTC day
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSnapshot {
    /// Orders created today
    pub orders_today: usize,
    /// Sum of today's order amounts
    pub revenue_today: f64,
    /// `payment_failed` events in the log that occurred today
    pub failed_payments: usize,
    /// Authorized orders idle past the shipping threshold
    pub at_risk_shipments: usize,
    /// Mean minutes between creation and last update for orders touched today
    pub avg_state_minutes: f64,
    /// Whether any order or event has been seen
    pub has_data: bool,
}

/// Compute the KPI snapshot from the order view and the event log
pub fn compute_kpis<'a, O, E>(
    orders: O,
    events: E,
    now: EpochMillis,
    thresholds: &IssueThresholds,
) -> KpiSnapshot
where
    O: IntoIterator<Item = &'a OrderAggregate>,
    E: IntoIterator<Item = &'a StreamEvent>,
{
    let today = start_of_utc_day(now);
    let mut snapshot = KpiSnapshot::default();
    let mut state_ms_total: i64 = 0;
    let mut updated_today: usize = 0;
    let mut order_count: usize = 0;

    for order in orders {
        order_count += 1;
        if order.created_at >= today {
            snapshot.orders_today += 1;
            snapshot.revenue_today += order.amount;
        }
        if order.current_status == OrderStatus::Authorized
            && now.saturating_sub(order.updated_at) > thresholds.shipping_late_ms
        {
            snapshot.at_risk_shipments += 1;
        }
        if order.updated_at >= today {
            updated_today += 1;
            let elapsed = order.updated_at.saturating_sub(order.created_at).max(0);
            state_ms_total = state_ms_total.saturating_add(elapsed);
        }
    }

    let mut event_count: usize = 0;
    for event in events {
        event_count += 1;
        let kind = event.as_order().map(|e| &e.kind);
        if let Some(OrderEventKind::PaymentFailed { failed_at, .. }) = kind {
            if *failed_at >= today {
                snapshot.failed_payments += 1;
            }
        }
    }

    snapshot.avg_state_minutes = state_ms_total as f64 / updated_today.max(1) as f64 / 60_000.0;
    snapshot.has_data = order_count > 0 || event_count > 0;
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::events::{Envelope, OrderStreamEvent};
    use crate::orders::reduce_order;

    const NOW: EpochMillis = 1_700_000_000_000;

    fn order_event(id: &str, order: &str, seq: u64, kind: OrderEventKind) -> OrderStreamEvent {
        let at = kind.occurred_at();
        OrderStreamEvent::new(Envelope::new(id, at, seq), order, kind)
    }

    fn created(order: &str, at: EpochMillis, amount: f64) -> OrderStreamEvent {
        order_event(
            &format!("c_{order}"),
            order,
            1,
            OrderEventKind::Created {
                customer_id: "cus_1".into(),
                country: "Spain".into(),
                category: "Books".into(),
                amount,
                currency: "USD".into(),
                created_at: at,
            },
        )
    }

    #[test]
    fn test_start_of_utc_day() {
        assert_eq!(start_of_utc_day(NOW), 1_699_920_000_000);
        assert_eq!(start_of_utc_day(-1), -DAY_MS);
    }

    #[test]
    fn test_timestamp_extremes_saturate() {
        let config = EngineConfig::default();
        assert_eq!(start_of_utc_day(i64::MIN), i64::MIN);

        let order = reduce_order(None, &created("ord_a", i64::MIN, 10.0), NOW, &config);
        let order = reduce_order(
            Some(&order),
            &order_event(
                "a2",
                "ord_a",
                2,
                OrderEventKind::PaymentAuthorized {
                    authorized_at: i64::MIN,
                },
            ),
            NOW,
            &config,
        );
        let events: [&StreamEvent; 0] = [];
        let snapshot = compute_kpis([&order], events, i64::MAX, &config.thresholds);
        assert_eq!(snapshot.at_risk_shipments, 1);
        assert_eq!(snapshot.orders_today, 0);
    }

    #[test]
    fn test_empty_snapshot_has_no_data() {
        let orders: [&OrderAggregate; 0] = [];
        let events: [&StreamEvent; 0] = [];
        let snapshot = compute_kpis(orders, events, NOW, &IssueThresholds::default());
        assert_eq!(snapshot, KpiSnapshot::default());
    }

    #[test]
    fn test_snapshot_counts_today_only() {
        let config = EngineConfig::default();
        let today = start_of_utc_day(NOW);

        let fresh = reduce_order(None, &created("ord_a", today + 1_000, 40.0), NOW, &config);
        let fresh = reduce_order(
            Some(&fresh),
            &order_event(
                "a2",
                "ord_a",
                2,
                OrderEventKind::PaymentAuthorized {
                    authorized_at: today + 61_000,
                },
            ),
            NOW,
            &config,
        );
        let stale = reduce_order(None, &created("ord_b", today - 5_000, 99.0), NOW, &config);

        let failed_today = StreamEvent::Order(order_event(
            "f1",
            "ord_b",
            3,
            OrderEventKind::PaymentFailed {
                failed_at: today + 10,
                reason: "card_declined".into(),
            },
        ));
        let failed_yesterday = StreamEvent::Order(order_event(
            "f0",
            "ord_b",
            2,
            OrderEventKind::PaymentFailed {
                failed_at: today - 10,
                reason: "card_declined".into(),
            },
        ));

        let snapshot = compute_kpis(
            [&fresh, &stale],
            [&failed_today, &failed_yesterday],
            NOW,
            &config.thresholds,
        );

        assert_eq!(snapshot.orders_today, 1);
        assert_eq!(snapshot.revenue_today, 40.0);
        assert_eq!(snapshot.failed_payments, 1);
        assert_eq!(snapshot.at_risk_shipments, 1);
        assert_eq!(snapshot.avg_state_minutes, 1.0);
        assert!(snapshot.has_data);
    }
}
