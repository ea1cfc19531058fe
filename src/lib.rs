// Copyright 2025 Cowboy AI, LLC.

//! # CIM Domain Orders
//!
//! Aggregation core for a live order-operations dashboard.
//!
//! The crate turns a continuous, unreliable stream of order-lifecycle and
//! connection events into materialized views and serves ad-hoc search over
//! them:
//! - **Events**: normalization of loosely shaped producer records into a typed union
//! - **Orders**: per-order aggregates with dedup, a status regression guard and bounded timelines
//! - **Connection**: a small state machine over connection-lifecycle events
//! - **Metrics**: sliding windows, a per-second series, KPIs and exceptions
//! - **Projections**: customers, category and country breakdowns, order filters
//! - **Search**: query parsing, domain providers, ranking and a lifecycle event bus
//! - **Runtime**: an optional single-writer actor for concurrent producers
//!
//! ## Design Principles
//!
//! 1. **Explicit state**: `ingest_batch` takes state and returns the next state
//! 2. **Totality**: duplicates, late events and partial events are absorbed, not raised
//! 3. **Determinism**: identical inputs and `now` give identical outputs
//! 4. **Bounded memory**: timelines, event log and dedup set all have stated caps
//!
//! ## Example
//!
//! ```rust
//! use cim_domain_orders::{DashboardEngine, EngineConfig, EventType, RawEvent, SearchEventBus};
//!
//! let engine = DashboardEngine::new(EngineConfig::default()).unwrap();
//! let now = 1_700_000_000_000;
//!
//! let outcome = engine.ingest_batch(
//!     engine.reset(),
//!     vec![
//!         RawEvent::order_created("ord_1", "cus_7", "Spain", "Office", 120.0, now - 5_000),
//!         RawEvent::order_update(EventType::PaymentFailed, "ord_1", now - 1_000)
//!             .with_reason("card_declined"),
//!     ],
//!     now,
//! );
//! assert_eq!(outcome.state.metrics.orders_per_minute, 1);
//!
//! let bus = SearchEventBus::default();
//! let result = engine.search(&outcome.state, "orders failed", &bus);
//! assert_eq!(result.hits[0].id, "orders:ord_1");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod connection;
pub mod dashboard;
pub mod errors;
pub mod events;
pub mod metrics;
pub mod orders;
pub mod projections;
pub mod runtime;
pub mod search;
pub mod state_machine;

pub use config::{EngineConfig, IssueThresholds};
pub use connection::ConnectionStatus;
pub use dashboard::{BatchOutcome, DashboardEngine, DashboardState};
pub use errors::{OrdersError, OrdersResult};
pub use events::{
    normalize_batch, normalize_event, Envelope, EpochMillis, EventType, NormalizedBatch,
    OrderEventKind, OrderStreamEvent, RawEvent, RejectedEvent, StreamEvent, SystemEventKind,
    SystemStreamEvent,
};
pub use metrics::{
    build_line_series, compute_exceptions, compute_kpis, ExceptionItem, KpiSnapshot, LinePoint,
    OutcomeSeries, WindowMetrics,
};
pub use orders::{
    apply_event_to_store, reduce_order, ApplyOutcome, DerivedIssue, OrderAggregate, OrderStatus,
    OrdersDomainStore,
};
pub use runtime::{
    pump, spawn_aggregator, AggregatorHandle, EventSource, ReceivedBatch, ReplaySource,
};
pub use search::{
    parse_query, GlobalSearchHit, GlobalSearchService, ParsedQuery, SearchDomain, SearchEventBus,
    SearchExecutionResult, SearchTriggerEvent,
};
pub use state_machine::{EventDrivenState, RankedState, State};
