// Copyright 2025 Cowboy AI, LLC.

//! Domain store: keyed order aggregates plus dedup and sequence bookkeeping

use super::aggregate::{reduce_order, OrderAggregate};
use crate::config::EngineConfig;
use crate::events::{EpochMillis, OrderStreamEvent, StreamEvent};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Outcome of applying one event to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The event was new and has been folded in
    Applied,
    /// The event id was already seen; only `last_seq` may have moved
    Duplicate,
}

impl ApplyOutcome {
    /// Whether the event changed anything beyond `last_seq`
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied)
    }
}

/// Capped set of processed event ids
///
/// When the capacity is exceeded the id with the lowest sequence number is
/// evicted. A replay of an evicted id is treated as a new event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenEventIds {
    ids: IndexMap<String, u64>,
    capacity: usize,
}

impl SeenEventIds {
    /// Create an empty set with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: IndexMap::with_capacity(capacity.saturating_add(1)),
            capacity: capacity.max(1),
        }
    }

    /// Whether `event_id` has been processed
    pub fn contains(&self, event_id: &str) -> bool {
        self.ids.contains_key(event_id)
    }

    /// Record `event_id`; returns `false` if it was already present
    ///
    /// The id just recorded is never the one evicted, even when its `seq` is
    /// the lowest retained.
    pub fn insert(&mut self, event_id: &str, seq: u64) -> bool {
        if self.ids.contains_key(event_id) {
            return false;
        }
        self.ids.insert(event_id.to_string(), seq);
        while self.ids.len() > self.capacity {
            if !self.evict_oldest() {
                break;
            }
        }
        true
    }

    // The newest id sits at the last index and is excluded from eviction.
    fn evict_oldest(&mut self) -> bool {
        let keep = self.ids.len().saturating_sub(1);
        let oldest = self
            .ids
            .values()
            .enumerate()
            .filter(|(index, _)| *index != keep)
            .min_by_key(|(index, seq)| (**seq, *index))
            .map(|(index, _)| index);
        match oldest {
            Some(index) => {
                self.ids.shift_remove_index(index);
                true
            }
            None => false,
        }
    }

    /// Number of retained ids
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no ids are retained
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Maximum number of retained ids
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SeenEventIds {
    fn default() -> Self {
        Self::new(EngineConfig::default().dedup_capacity)
    }
}

/// Keyed collection of order aggregates
///
/// Logically single-writer: callers must not apply two batches concurrently.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrdersDomainStore {
    orders_by_id: IndexMap<String, OrderAggregate>,
    seen_event_ids: SeenEventIds,
    last_seq: u64,
}

impl OrdersDomainStore {
    /// Create an empty store
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            orders_by_id: IndexMap::new(),
            seen_event_ids: SeenEventIds::new(config.dedup_capacity),
            last_seq: 0,
        }
    }

    /// Apply one event in place
    pub fn apply(
        &mut self,
        event: &StreamEvent,
        now: EpochMillis,
        config: &EngineConfig,
    ) -> ApplyOutcome {
        self.last_seq = self.last_seq.max(event.seq());

        if !self.seen_event_ids.insert(event.event_id(), event.seq()) {
            trace!(event_id = %event.event_id(), "Ignoring duplicate event");
            return ApplyOutcome::Duplicate;
        }

        if let StreamEvent::Order(order_event) = event {
            self.fold_order_event(order_event, now, config);
        }
        ApplyOutcome::Applied
    }

    fn fold_order_event(
        &mut self,
        event: &OrderStreamEvent,
        now: EpochMillis,
        config: &EngineConfig,
    ) {
        let next = reduce_order(self.orders_by_id.get(&event.order_id), event, now, config);
        self.orders_by_id.insert(event.order_id.clone(), next);
    }

    /// Re-derive every order's issue against `now`
    pub fn refresh_issues(&mut self, now: EpochMillis, config: &EngineConfig) {
        for order in self.orders_by_id.values_mut() {
            order.refresh_issue(now, config);
        }
    }

    /// Look up an order
    pub fn order(&self, order_id: &str) -> Option<&OrderAggregate> {
        self.orders_by_id.get(order_id)
    }

    /// All orders in first-seen order
    pub fn orders(&self) -> impl Iterator<Item = &OrderAggregate> {
        self.orders_by_id.values()
    }

    /// Timeline index for one order, oldest first
    pub fn timeline(&self, order_id: &str) -> &[OrderStreamEvent] {
        self.orders_by_id
            .get(order_id)
            .map(|o| o.timeline.as_slice())
            .unwrap_or_default()
    }

    /// Sequence high-water mark
    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    /// Whether `event_id` is in the dedup set
    pub fn has_seen(&self, event_id: &str) -> bool {
        self.seen_event_ids.contains(event_id)
    }

    /// Dedup bookkeeping
    pub fn seen_event_ids(&self) -> &SeenEventIds {
        &self.seen_event_ids
    }

    /// Number of orders
    pub fn len(&self) -> usize {
        self.orders_by_id.len()
    }

    /// Whether the store holds no orders
    pub fn is_empty(&self) -> bool {
        self.orders_by_id.is_empty()
    }
}

/// Pure form of [`OrdersDomainStore::apply`]: consume a store, return the next
pub fn apply_event_to_store(
    mut store: OrdersDomainStore,
    event: &StreamEvent,
    now: EpochMillis,
    config: &EngineConfig,
) -> OrdersDomainStore {
    store.apply(event, now, config);
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Envelope, OrderEventKind, SystemEventKind, SystemStreamEvent};
    use crate::orders::OrderStatus;

    fn picked(id: &str, order: &str, seq: u64) -> StreamEvent {
        StreamEvent::Order(OrderStreamEvent::new(
            Envelope::new(id, seq as i64 * 100, seq),
            order,
            OrderEventKind::Picked {
                picked_at: seq as i64 * 100,
            },
        ))
    }

    #[test]
    fn test_duplicate_is_noop() {
        let config = EngineConfig::default();
        let mut store = OrdersDomainStore::new(&config);
        let event = picked("evt_1", "ord_1", 1);

        assert_eq!(store.apply(&event, 0, &config), ApplyOutcome::Applied);
        let snapshot = store.clone();
        assert_eq!(store.apply(&event, 0, &config), ApplyOutcome::Duplicate);
        assert_eq!(store, snapshot);
    }

    #[test]
    fn test_system_events_only_touch_bookkeeping() {
        let config = EngineConfig::default();
        let store = OrdersDomainStore::new(&config);
        let event = StreamEvent::System(SystemStreamEvent {
            envelope: Envelope::new("evt_sys", 1, 9),
            kind: SystemEventKind::Connected { at: 1 },
        });
        let store = apply_event_to_store(store, &event, 1, &config);
        assert!(store.is_empty());
        assert_eq!(store.last_seq(), 9);
        assert!(store.has_seen("evt_sys"));
    }

    #[test]
    fn test_timeline_index_follows_aggregate() {
        let config = EngineConfig::default();
        let mut store = OrdersDomainStore::new(&config);
        store.apply(&picked("evt_1", "ord_1", 1), 0, &config);
        store.apply(&picked("evt_2", "ord_2", 2), 0, &config);
        store.apply(&picked("evt_3", "ord_1", 3), 0, &config);

        assert_eq!(store.len(), 2);
        assert_eq!(store.timeline("ord_1").len(), 2);
        assert!(store.timeline("ord_missing").is_empty());
        assert_eq!(
            store.order("ord_2").map(|o| o.current_status),
            Some(OrderStatus::Picked)
        );
    }

    #[test]
    fn test_seen_ids_evict_lowest_seq() {
        let mut seen = SeenEventIds::new(3);
        assert!(seen.insert("b", 5));
        assert!(seen.insert("a", 1));
        assert!(seen.insert("c", 7));
        assert!(seen.insert("d", 3));
        assert_eq!(seen.len(), 3);
        assert!(!seen.contains("a"));
        assert!(seen.contains("b"));
        assert!(seen.contains("d"));
        assert!(!seen.insert("d", 3));
    }

    #[test]
    fn test_seen_ids_keep_late_low_seq_insert() {
        let mut seen = SeenEventIds::new(3);
        assert!(seen.insert("b", 5));
        assert!(seen.insert("c", 7));
        assert!(seen.insert("d", 9));
        assert!(seen.insert("late", 1));
        assert_eq!(seen.len(), 3);
        assert!(seen.contains("late"));
        assert!(!seen.contains("b"));
        assert!(!seen.insert("late", 1));
    }

    #[test]
    fn test_late_event_on_full_dedup_set_is_applied_once() {
        let config = EngineConfig {
            dedup_capacity: 400,
            ..Default::default()
        };
        let mut store = OrdersDomainStore::new(&config);
        for seq in 11..=410 {
            let event = picked(&format!("evt_{seq}"), &format!("ord_{seq}"), seq);
            store.apply(&event, 0, &config);
        }
        assert_eq!(store.seen_event_ids().len(), 400);

        let late = picked("evt_late", "ord_late", 1);
        let once = apply_event_to_store(store, &late, 0, &config);
        assert!(once.has_seen("evt_late"));
        let twice = apply_event_to_store(once.clone(), &late, 0, &config);

        assert_eq!(twice.timeline("ord_late").len(), 1);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_store_dedup_is_bounded() {
        let config = EngineConfig {
            dedup_capacity: 10,
            ..Default::default()
        };
        let mut store = OrdersDomainStore::new(&config);
        for seq in 1..=50 {
            store.apply(&picked(&format!("evt_{seq}"), "ord_1", seq), 0, &config);
        }
        assert_eq!(store.seen_event_ids().len(), 10);
        assert!(store.has_seen("evt_50"));
        assert!(!store.has_seen("evt_1"));
        assert_eq!(store.last_seq(), 50);
    }
}
