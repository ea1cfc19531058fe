// Copyright 2025 Cowboy AI, LLC.

//! Read model projections over the order view
//!
//! Projections are recomputed from the domain store on demand. They never
//! mutate it, and the search providers read them rather than the store.

pub mod customers;
pub mod filters;
pub mod sales;

pub use customers::{derive_customers, CustomerAggregate};
pub use filters::{apply_orders_filter, OrdersFilter};
pub use sales::{category_sales, country_shares, CategorySales, CountryShare};
