use cim_domain_orders::metrics::{CreatedSample, SampleWindow};
use cim_domain_orders::{
    apply_event_to_store, build_line_series, normalize_batch, parse_query, DashboardEngine,
    EngineConfig, EventType, OrderStatus, OrdersDomainStore, RankedState, RawEvent, SearchEventBus,
    StreamEvent,
};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

const T: i64 = 1_700_000_000_000;

const ORDER_TYPES: [EventType; 7] = [
    EventType::OrderCreated,
    EventType::PaymentAuthorized,
    EventType::PaymentFailed,
    EventType::OrderPicked,
    EventType::OrderShipped,
    EventType::OrderDelivered,
    EventType::OrderCancelled,
];

fn raw_order_event() -> impl Strategy<Value = RawEvent> {
    (0..ORDER_TYPES.len(), 0..4u8, 0..120_000i64, 0..40i64, 0..12u8).prop_map(
        |(kind, order, offset, seq, id)| {
            let event_type = ORDER_TYPES[kind];
            let order_id = format!("ord_{order}");
            let raw = if event_type == EventType::OrderCreated {
                RawEvent::order_created(order_id, "cus_p", "Spain", "Office", 25.0, T + offset)
            } else {
                RawEvent::order_update(event_type, order_id, T + offset)
            };
            raw.with_event_id(format!("evt_{id}")).with_seq(seq)
        },
    )
}

fn any_seq() -> impl Strategy<Value = i64> {
    prop_oneof![Just(0i64), 1..4i64, 0..10_000i64]
}

/// Normalized events with unique ids and sequences, at most one creation per order
fn distinct_order_events() -> impl Strategy<Value = Vec<StreamEvent>> {
    proptest::collection::vec((0..ORDER_TYPES.len(), 0..4u8, 0..120_000i64), 1..32).prop_map(
        |specs| {
            let mut created = HashSet::new();
            let batch = specs
                .into_iter()
                .enumerate()
                .map(|(i, (kind, order, offset))| {
                    let order_id = format!("ord_{order}");
                    let mut event_type = ORDER_TYPES[kind];
                    if event_type == EventType::OrderCreated && !created.insert(order) {
                        event_type = EventType::OrderPicked;
                    }
                    let at = T + offset;
                    let raw = if event_type == EventType::OrderCreated {
                        RawEvent::order_created(order_id, "cus_p", "Spain", "Office", 25.0, at)
                    } else {
                        RawEvent::order_update(event_type, order_id, at)
                    };
                    raw.with_event_id(format!("evt_{i}")).with_seq(i as i64 + 1)
                })
                .collect();
            normalize_batch(batch, 0).events
        },
    )
}

fn search_token() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["spain", "italy", "office", "kids", "created", "cus_1"])
}

fn created_samples() -> impl Strategy<Value = Vec<CreatedSample>> {
    proptest::collection::vec((0..180_000i64, 1..500u32), 0..48).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (back, amount))| CreatedSample {
                at: T - back,
                amount: f64::from(amount),
                order_id: format!("ord_{i}"),
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn applying_an_event_twice_equals_applying_it_once(
        batch in proptest::collection::vec((raw_order_event(), any_seq()), 1..48)
    ) {
        let config = EngineConfig {
            dedup_capacity: 4,
            ..Default::default()
        };
        let batch: Vec<RawEvent> = batch.into_iter().map(|(raw, seq)| raw.with_seq(seq)).collect();
        let events = normalize_batch(batch, 0).events;

        let mut store = OrdersDomainStore::new(&config);
        for event in &events {
            store = apply_event_to_store(store, event, T + 200_000, &config);
            let again = apply_event_to_store(store.clone(), event, T + 200_000, &config);
            prop_assert_eq!(&again, &store);
        }
    }

    #[test]
    fn arrival_order_does_not_change_the_aggregate(
        (events, shuffled) in distinct_order_events()
            .prop_flat_map(|events| (Just(events.clone()), Just(events).prop_shuffle()))
    ) {
        let config = EngineConfig {
            timeline_cap: 64,
            ..Default::default()
        };
        let fold = |events: &[StreamEvent]| {
            events.iter().fold(OrdersDomainStore::new(&config), |store, event| {
                apply_event_to_store(store, event, T + 200_000, &config)
            })
        };

        let in_order = fold(&events);
        let reordered = fold(&shuffled);
        prop_assert_eq!(in_order.last_seq(), reordered.last_seq());
        for order in 0..4 {
            let order_id = format!("ord_{order}");
            prop_assert_eq!(in_order.order(&order_id), reordered.order(&order_id));
        }
    }

    #[test]
    fn status_never_moves_to_a_lower_rank(
        batch in proptest::collection::vec(raw_order_event(), 1..24)
    ) {
        let config = EngineConfig::default();
        let mut store = OrdersDomainStore::new(&config);
        for event in normalize_batch(batch, 0).events {
            let before: Option<OrderStatus> = event
                .order_id()
                .and_then(|id| store.order(id))
                .map(|o| o.current_status);
            store = apply_event_to_store(store, &event, T + 200_000, &config);
            let after = event
                .order_id()
                .and_then(|id| store.order(id))
                .map(|o| o.current_status);
            if let (Some(before), Some(after)) = (before, after) {
                prop_assert!(after.rank() >= before.rank());
            }
        }
    }

    #[test]
    fn store_state_is_bounded(
        batch in proptest::collection::vec(raw_order_event(), 1..64)
    ) {
        let config = EngineConfig {
            timeline_cap: 4,
            dedup_capacity: 8,
            ..Default::default()
        };
        let mut store = OrdersDomainStore::new(&config);
        for event in normalize_batch(batch, 0).events {
            store = apply_event_to_store(store, &event, T, &config);
        }
        prop_assert!(store.seen_event_ids().len() <= 8);
        prop_assert!(store.orders().all(|o| o.timeline.len() <= 4));
    }

    #[test]
    fn pruning_keeps_exactly_the_samples_inside_the_window(
        samples in created_samples(),
        window_ms in 1_000..120_000i64
    ) {
        let mut window: SampleWindow<CreatedSample> = samples.iter().cloned().collect();
        window.prune(T, window_ms);
        let expected = samples.iter().filter(|s| T - s.at <= window_ms).count();
        prop_assert_eq!(window.len(), expected);

        let kept = window.len();
        window.prune(T + 1_000, window_ms);
        prop_assert!(window.len() <= kept);
    }

    #[test]
    fn line_series_is_deterministic_and_counts_recent_samples(samples in created_samples()) {
        let first = build_line_series(T, &samples);
        let second = build_line_series(T, &samples);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), 60);
        prop_assert!(first.windows(2).all(|pair| pair[0].at + 1_000 == pair[1].at));

        let counted: usize = first.iter().map(|p| p.count).sum();
        prop_assert!(counted <= samples.len());
    }

    #[test]
    fn parsed_terms_never_contain_domain_tokens(raw in "[a-z_ ]{0,40}") {
        let parsed = parse_query(&raw);
        prop_assert!(!parsed.selected_domains.is_empty());
        for term in &parsed.terms {
            prop_assert!(cim_domain_orders::SearchDomain::ALL
                .iter()
                .all(|domain| !domain.synonyms().contains(&term.as_str())));
        }
    }

    #[test]
    fn extra_terms_never_widen_the_result(
        orders in proptest::collection::vec((0..3usize, 0..3usize, 1..500u32), 1..12),
        first in search_token(),
        second in search_token(),
    ) {
        let countries = ["Spain", "Italy", "France"];
        let categories = ["Office", "Kids", "Garden"];
        let batch: Vec<RawEvent> = orders
            .iter()
            .enumerate()
            .map(|(i, (country, category, amount))| {
                RawEvent::order_created(
                    format!("ord_{i}"),
                    format!("cus_{}", i % 3),
                    countries[*country],
                    categories[*category],
                    f64::from(*amount),
                    T + i as i64,
                )
            })
            .collect();

        let engine = DashboardEngine::new(EngineConfig::default()).expect("valid config");
        let state = engine.ingest_batch(engine.reset(), batch, T + 100).state;
        let bus = SearchEventBus::default();

        let ids = |query: String| -> BTreeSet<String> {
            engine
                .search(&state, &query, &bus)
                .hits
                .into_iter()
                .map(|hit| hit.id)
                .collect()
        };

        let narrow = ids(format!("orders {first} {second}"));
        let wide = ids(format!("orders {first}"));
        prop_assert!(narrow.is_subset(&wide));
    }
}
