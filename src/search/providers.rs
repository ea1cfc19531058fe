// Copyright 2025 Cowboy AI, LLC.

//! Domain search providers
//!
//! Each provider matches the parsed terms against a haystack built from the
//! salient fields of its records. A record matches only when every term is a
//! substring of its haystack; no terms match everything.

use super::{GlobalSearchHit, ParsedQuery, SearchDomain};
use crate::events::{EpochMillis, OrderEventKind, StreamEvent, SystemEventKind};
use crate::orders::{OrderAggregate, OrderStatus};
use crate::projections::{derive_customers, CustomerAggregate};
use std::cmp::Reverse;

/// Searches one domain
#[cfg_attr(test, mockall::automock)]
pub trait DomainSearchProvider: Send + Sync {
    /// Domain served by this provider
    fn domain(&self) -> SearchDomain;

    /// Matching hits, at most the provider's limit, in record order
    fn search(&self, query: &ParsedQuery) -> Vec<GlobalSearchHit>;
}

/// Whether every term occurs in the lowercased haystack
pub fn includes_all_terms(haystack: &str, terms: &[String]) -> bool {
    if terms.is_empty() {
        return true;
    }
    let text = haystack.to_lowercase();
    terms.iter().all(|term| text.contains(term.as_str()))
}

/// Base relevance plus a recency term too small to reorder different bases
pub fn build_score(base: f64, at: EpochMillis) -> f64 {
    base + at as f64 / 1_000_000_000_000.0
}

/// Searches order aggregates
pub struct OrderSearchProvider<'a> {
    orders: Vec<&'a OrderAggregate>,
    limit: usize,
}

impl<'a> OrderSearchProvider<'a> {
    /// Index orders, most recently updated first
    pub fn new(orders: impl IntoIterator<Item = &'a OrderAggregate>, limit: usize) -> Self {
        let mut orders: Vec<&OrderAggregate> = orders.into_iter().collect();
        orders.sort_by_key(|o| Reverse(o.updated_at));
        Self { orders, limit }
    }

    fn status_boost(status: OrderStatus) -> f64 {
        match status {
            OrderStatus::Failed => 3.0,
            OrderStatus::Authorized => 2.0,
            _ => 1.0,
        }
    }
}

impl DomainSearchProvider for OrderSearchProvider<'_> {
    fn domain(&self) -> SearchDomain {
        SearchDomain::Orders
    }

    fn search(&self, query: &ParsedQuery) -> Vec<GlobalSearchHit> {
        self.orders
            .iter()
            .filter(|order| {
                let haystack = format!(
                    "{} {} {} {} {} {} {:.2}",
                    order.order_id,
                    order.customer_id,
                    order.country,
                    order.category,
                    order.current_status,
                    order.currency,
                    order.amount
                );
                includes_all_terms(&haystack, &query.terms)
            })
            .take(self.limit)
            .map(|order| GlobalSearchHit {
                id: format!("orders:{}", order.order_id),
                domain: SearchDomain::Orders,
                title: format!("{} ({})", order.order_id, order.current_status),
                subtitle: format!(
                    "{} | {} | {} {:.2}",
                    order.customer_id, order.country, order.currency, order.amount
                ),
                at: order.updated_at,
                score: build_score(
                    70.0 + Self::status_boost(order.current_status),
                    order.updated_at,
                ),
            })
            .collect()
    }
}

/// Searches the raw event log
pub struct ActivitySearchProvider<'a> {
    events: Vec<&'a StreamEvent>,
    limit: usize,
}

impl<'a> ActivitySearchProvider<'a> {
    /// Index events in the order given, normally newest first
    pub fn new(events: impl IntoIterator<Item = &'a StreamEvent>, limit: usize) -> Self {
        Self {
            events: events.into_iter().collect(),
            limit,
        }
    }
}

struct ActivityFields<'e> {
    reference: &'e str,
    customer_id: &'e str,
    country: &'e str,
    category: &'e str,
    reason: &'e str,
}

impl<'e> ActivityFields<'e> {
    fn of(event: &'e StreamEvent) -> Self {
        let mut fields = ActivityFields {
            reference: "system",
            customer_id: "",
            country: "",
            category: "",
            reason: "",
        };
        match event {
            StreamEvent::Order(order_event) => {
                fields.reference = order_event.order_id.as_str();
                if let OrderEventKind::Created {
                    customer_id,
                    country,
                    category,
                    ..
                } = &order_event.kind
                {
                    fields.customer_id = customer_id.as_str();
                    fields.country = country.as_str();
                    fields.category = category.as_str();
                }
                fields.reason = order_event.kind.reason().unwrap_or_default();
            }
            StreamEvent::System(system) => {
                if let SystemEventKind::Disconnected {
                    reason: Some(reason),
                    ..
                } = &system.kind
                {
                    fields.reason = reason.as_str();
                }
            }
        }
        fields
    }

    fn subtitle(&self) -> String {
        let mut subtitle = format!("ref {}", self.reference);
        if !self.customer_id.is_empty() {
            subtitle.push_str(&format!(" / {}", self.customer_id));
        }
        if !self.country.is_empty() {
            subtitle.push_str(&format!(" / {}", self.country));
        }
        if !self.reason.is_empty() {
            subtitle.push_str(&format!(" ({})", self.reason));
        }
        subtitle
    }
}

impl DomainSearchProvider for ActivitySearchProvider<'_> {
    fn domain(&self) -> SearchDomain {
        SearchDomain::Activity
    }

    fn search(&self, query: &ParsedQuery) -> Vec<GlobalSearchHit> {
        self.events
            .iter()
            .filter_map(|event| {
                let fields = ActivityFields::of(event);
                let haystack = format!(
                    "{} {} {} {} {} {}",
                    event.event_type(),
                    fields.reference,
                    fields.customer_id,
                    fields.country,
                    fields.category,
                    fields.reason
                );
                includes_all_terms(&haystack, &query.terms).then(|| GlobalSearchHit {
                    id: format!("activity:{}", event.event_id()),
                    domain: SearchDomain::Activity,
                    title: event.event_type().to_string(),
                    subtitle: fields.subtitle(),
                    at: event.ts(),
                    score: build_score(60.0, event.ts()),
                })
            })
            .take(self.limit)
            .collect()
    }
}

/// Searches customers derived from orders
pub struct CustomerSearchProvider {
    customers: Vec<CustomerAggregate>,
    limit: usize,
}

impl CustomerSearchProvider {
    /// Derive customers from the order view
    pub fn new<'a>(orders: impl IntoIterator<Item = &'a OrderAggregate>, limit: usize) -> Self {
        Self {
            customers: derive_customers(orders),
            limit,
        }
    }
}

impl DomainSearchProvider for CustomerSearchProvider {
    fn domain(&self) -> SearchDomain {
        SearchDomain::Customers
    }

    fn search(&self, query: &ParsedQuery) -> Vec<GlobalSearchHit> {
        self.customers
            .iter()
            .filter(|customer| {
                let haystack = format!(
                    "{} {} {} {:.2}",
                    customer.customer_id, customer.country, customer.order_count, customer.spend
                );
                includes_all_terms(&haystack, &query.terms)
            })
            .take(self.limit)
            .map(|customer| GlobalSearchHit {
                id: format!("customers:{}", customer.customer_id),
                domain: SearchDomain::Customers,
                title: customer.customer_id.clone(),
                subtitle: format!(
                    "{} | {} orders | {:.2} USD",
                    customer.country, customer.order_count, customer.spend
                ),
                at: customer.last_seen_at,
                score: build_score(
                    55.0 + customer.order_count.min(8) as f64,
                    customer.last_seen_at,
                ),
            })
            .collect()
    }
}
