// Copyright 2025 Cowboy AI, LLC.

//! Dashboard state and the batch ingest entry point
//!
//! [`DashboardEngine::ingest_batch`] is a pure state transition: it takes the
//! previous [`DashboardState`] by value and returns the next one. Observers
//! are notified separately (see [`crate::runtime`]), never from inside the
//! reducer.

use crate::config::EngineConfig;
use crate::connection::ConnectionStatus;
use crate::errors::OrdersResult;
use crate::events::{
    normalize_batch, EpochMillis, OrderEventKind, OrderStreamEvent, RawEvent, RejectedEvent,
    StreamEvent,
};
use crate::metrics::{
    build_line_series, compute_exceptions, compute_kpis, CreatedSample, ExceptionItem, KpiSnapshot,
    LinePoint, OutcomeSample, OutcomeSeries, SampleWindow, WindowMetrics,
};
use crate::orders::{
    count_by_status, select_order_timeline, select_orders, ApplyOutcome, OrderAggregate,
    OrdersDomainStore, StatusCounts,
};
use crate::projections::{
    apply_orders_filter, category_sales, country_shares, derive_customers, CategorySales,
    CountryShare, CustomerAggregate, OrdersFilter,
};
use crate::search::{
    ActivitySearchProvider, CustomerSearchProvider, GlobalSearchService, OrderSearchProvider,
    SearchEventBus, SearchExecutionResult,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Everything the dashboard shows, as of the last ingested batch
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    /// Upstream stream status
    pub connection: ConnectionStatus,
    /// `now` of the last ingested batch
    pub last_updated_at: Option<EpochMillis>,
    /// Order aggregates and dedup bookkeeping
    pub store: OrdersDomainStore,
    /// Accepted events, newest first, capped
    pub event_log: VecDeque<StreamEvent>,
    /// Order creations within the window
    pub created_window: SampleWindow<CreatedSample>,
    /// Payment outcomes within the window
    pub outcome_window: SampleWindow<OutcomeSample>,
    /// Metrics derived from the windows
    pub metrics: WindowMetrics,
    /// Per-second created-orders series
    pub line_series: Vec<LinePoint>,
    /// Success/failure totals
    pub outcome_series: OutcomeSeries,
}

impl DashboardState {
    /// Empty state for a fresh stream
    pub fn empty(config: &EngineConfig) -> Self {
        Self {
            store: OrdersDomainStore::new(config),
            ..Default::default()
        }
    }

    /// All orders in first-seen order
    pub fn orders(&self) -> impl Iterator<Item = &OrderAggregate> {
        self.store.orders()
    }

    /// Most recently updated orders
    pub fn recent_orders(&self, limit: usize) -> Vec<&OrderAggregate> {
        select_orders(&self.store, limit)
    }

    /// Orders passing `filter` at `now`, in first-seen order
    pub fn filtered_orders(&self, filter: &OrdersFilter, now: EpochMillis) -> Vec<&OrderAggregate> {
        apply_orders_filter(self.store.orders(), filter, now)
    }

    /// Totals per status bucket
    pub fn status_counts(&self) -> StatusCounts {
        count_by_status(self.store.orders())
    }

    /// One order's timeline, newest first
    pub fn order_timeline(&self, order_id: &str) -> Vec<&OrderStreamEvent> {
        select_order_timeline(&self.store, Some(order_id))
    }

    /// KPI snapshot at `now`
    pub fn kpis(&self, now: EpochMillis, config: &EngineConfig) -> KpiSnapshot {
        compute_kpis(self.store.orders(), &self.event_log, now, &config.thresholds)
    }

    /// Exceptions panel at `now`
    pub fn exceptions(&self, now: EpochMillis, config: &EngineConfig) -> Vec<ExceptionItem> {
        compute_exceptions(self.store.orders(), &self.event_log, now, &config.thresholds)
    }

    /// Customers derived from orders
    pub fn customers(&self) -> Vec<CustomerAggregate> {
        derive_customers(self.store.orders())
    }

    /// Revenue by category
    pub fn category_sales(&self) -> Vec<CategorySales> {
        category_sales(self.store.orders())
    }

    /// Order share by country
    pub fn country_shares(&self) -> Vec<CountryShare> {
        country_shares(self.store.orders())
    }
}

/// Result of ingesting one batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    /// The next state
    pub state: DashboardState,
    /// Raw events that could not be normalized
    pub rejected: Vec<RejectedEvent>,
    /// Events folded into the state
    pub applied: usize,
    /// Events skipped as already seen
    pub duplicates: usize,
}

/// Pure batch-to-state engine
#[derive(Debug, Clone, Default)]
pub struct DashboardEngine {
    config: EngineConfig,
}

impl DashboardEngine {
    /// Create an engine after validating `config`
    pub fn new(config: EngineConfig) -> OrdersResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Discard everything and start over
    pub fn reset(&self) -> DashboardState {
        info!("Resetting dashboard state");
        DashboardState::empty(&self.config)
    }

    /// Normalize and fold one batch received at `now`
    pub fn ingest_batch(
        &self,
        mut state: DashboardState,
        batch: Vec<RawEvent>,
        now: EpochMillis,
    ) -> BatchOutcome {
        let received = batch.len();
        let normalized = normalize_batch(batch, state.store.last_seq());
        let mut applied = 0;
        let mut duplicates = 0;

        for event in normalized.events {
            if state.store.apply(&event, now, &self.config) == ApplyOutcome::Duplicate {
                duplicates += 1;
                continue;
            }
            applied += 1;
            self.record(&mut state, event);
        }

        state.store.refresh_issues(now, &self.config);
        self.refresh_metrics(&mut state, now);

        debug!(
            received,
            applied,
            duplicates,
            rejected = normalized.rejected.len(),
            last_seq = state.store.last_seq(),
            orders = state.store.len(),
            "Ingested batch"
        );

        BatchOutcome {
            state,
            rejected: normalized.rejected,
            applied,
            duplicates,
        }
    }

    fn record(&self, state: &mut DashboardState, event: StreamEvent) {
        state.connection = state.connection.track(&event);

        if let StreamEvent::Order(order_event) = &event {
            let order_id = order_event.order_id.clone();
            match &order_event.kind {
                OrderEventKind::Created {
                    amount, created_at, ..
                } => state.created_window.push(CreatedSample {
                    at: *created_at,
                    amount: *amount,
                    order_id,
                }),
                OrderEventKind::PaymentAuthorized { authorized_at } => {
                    state.outcome_window.push(OutcomeSample {
                        at: *authorized_at,
                        ok: true,
                        order_id,
                    })
                }
                OrderEventKind::PaymentFailed { failed_at, .. } => {
                    state.outcome_window.push(OutcomeSample {
                        at: *failed_at,
                        ok: false,
                        order_id,
                    })
                }
                _ => {}
            }
        }

        state.event_log.push_front(event);
        state.event_log.truncate(self.config.event_log_cap);
    }

    fn refresh_metrics(&self, state: &mut DashboardState, now: EpochMillis) {
        state.created_window.prune(now, self.config.window_ms);
        state.outcome_window.prune(now, self.config.window_ms);
        state.metrics = WindowMetrics::compute(&state.created_window, &state.outcome_window);
        state.line_series = build_line_series(now, state.created_window.samples());
        state.outcome_series = OutcomeSeries::from_samples(state.outcome_window.samples());
        state.last_updated_at = Some(now);
    }

    /// Run a global search over `state`
    pub fn search(
        &self,
        state: &DashboardState,
        raw_query: &str,
        bus: &SearchEventBus,
    ) -> SearchExecutionResult {
        let limit = self.config.max_hits_per_provider;
        GlobalSearchService::new(bus, self.config.max_search_hits)
            .with_provider(OrderSearchProvider::new(state.store.orders(), limit))
            .with_provider(ActivitySearchProvider::new(&state.event_log, limit))
            .with_provider(CustomerSearchProvider::new(state.store.orders(), limit))
            .search(raw_query)
    }
}
