// Copyright 2025 Cowboy AI, LLC.

//! Order aggregates
//!
//! One [`OrderAggregate`] per distinct order id, folded from the event stream
//! by [`reduce_order`] and kept in an [`OrdersDomainStore`].

pub mod aggregate;
pub mod selectors;
pub mod status;
pub mod store;

pub use aggregate::{reduce_order, OrderAggregate};
pub use selectors::{count_by_status, select_order_timeline, select_orders, StatusCounts};
pub use status::{derive_issue, DerivedIssue, OrderStatus};
pub use store::{apply_event_to_store, ApplyOutcome, OrdersDomainStore, SeenEventIds};

/// Customer id used until an `order_created` event supplies the real one
pub const UNKNOWN_CUSTOMER: &str = "cus_unknown";

/// Country used until an `order_created` event supplies the real one
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Category used until an `order_created` event supplies the real one
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Currency assumed when none is supplied
pub const UNKNOWN_CURRENCY: &str = "USD";
