// Copyright 2025 Cowboy AI, LLC.

//! Multi-domain search over the materialized views
//!
//! A free-text query is parsed into domain selectors and residual terms,
//! fanned out to one provider per selected domain, then merged and ranked.
//! Every execution publishes its lifecycle on a [`SearchEventBus`].
//!
//! Search is synchronous. Debouncing keystrokes is the caller's business.

pub mod bus;
pub mod providers;
pub mod query;
pub mod service;

pub use bus::{ListenerId, SearchEventBus};
pub use providers::{
    ActivitySearchProvider, CustomerSearchProvider, DomainSearchProvider, OrderSearchProvider,
};
pub use query::parse_query;
pub use service::GlobalSearchService;

use crate::events::EpochMillis;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A searchable domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchDomain {
    /// Order aggregates
    Orders,
    /// The raw event log
    Activity,
    /// Customers derived from orders
    Customers,
}

impl SearchDomain {
    /// Every domain, in broad-search order
    pub const ALL: [SearchDomain; 3] = [
        SearchDomain::Orders,
        SearchDomain::Activity,
        SearchDomain::Customers,
    ];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchDomain::Orders => "orders",
            SearchDomain::Activity => "activity",
            SearchDomain::Customers => "customers",
        }
    }

    /// Query tokens that select this domain
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            SearchDomain::Orders => &["order", "orders", "payment", "payments", "checkout"],
            SearchDomain::Activity => &[
                "activity",
                "activities",
                "event",
                "events",
                "stream",
                "log",
                "logs",
            ],
            SearchDomain::Customers => &[
                "customer",
                "customers",
                "user",
                "users",
                "buyer",
                "buyers",
                "country",
                "countries",
                // common misspelling
                "coutry",
            ],
        }
    }

    /// The domain a normalized token selects, if any
    pub fn from_token(token: &str) -> Option<Self> {
        SearchDomain::ALL
            .into_iter()
            .find(|domain| domain.synonyms().contains(&token))
    }
}

impl fmt::Display for SearchDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A domain selected by an explicit query token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIntent {
    /// Selected domain
    pub domain: SearchDomain,
    /// Token that selected it
    pub token: String,
}

/// A tokenized query
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuery {
    /// The trimmed input
    pub raw: String,
    /// Free-text terms, lowercased, in input order
    pub terms: Vec<String>,
    /// Domain selections in first-seen order
    pub intents: Vec<SearchIntent>,
    /// Domains to search; every domain when none was named
    pub selected_domains: Vec<SearchDomain>,
}

/// One ranked search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSearchHit {
    /// `<domain>:<key>`
    pub id: String,
    /// Domain that produced the hit
    pub domain: SearchDomain,
    /// Headline
    pub title: String,
    /// Secondary line
    pub subtitle: String,
    /// Recency of the underlying record
    pub at: EpochMillis,
    /// Base relevance plus a recency tiebreak
    pub score: f64,
}

/// Lifecycle event published for every search execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchTriggerEvent {
    /// Published before any provider runs
    #[serde(rename_all = "camelCase")]
    QueryStarted {
        /// Publish time
        at: EpochMillis,
        /// Trimmed query
        query: String,
        /// Domains about to be searched
        domains: Vec<SearchDomain>,
    },
    /// Published after each provider returns
    #[serde(rename_all = "camelCase")]
    DomainSearched {
        /// Publish time
        at: EpochMillis,
        /// Domain searched
        domain: SearchDomain,
        /// Hits returned by that provider
        hit_count: usize,
    },
    /// Published once results are merged
    #[serde(rename_all = "camelCase")]
    QueryCompleted {
        /// Publish time
        at: EpochMillis,
        /// Trimmed query
        query: String,
        /// Hits after truncation
        total_hits: usize,
        /// Wall-clock duration of the fan-out, at least 1
        took_ms: u64,
    },
}

/// Result of one search execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchExecutionResult {
    /// Ranked hits
    pub hits: Vec<GlobalSearchHit>,
    /// Wall-clock duration, at least 1
    pub took_ms: u64,
    /// Domains that were searched
    pub selected_domains: Vec<SearchDomain>,
    /// Free-text terms applied
    pub terms: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_to_domain() {
        assert_eq!(SearchDomain::from_token("payments"), Some(SearchDomain::Orders));
        assert_eq!(SearchDomain::from_token("logs"), Some(SearchDomain::Activity));
        assert_eq!(SearchDomain::from_token("coutry"), Some(SearchDomain::Customers));
        assert_eq!(SearchDomain::from_token("failed"), None);
    }

    #[test]
    fn test_trigger_event_wire_shape() {
        let event = SearchTriggerEvent::DomainSearched {
            at: 7,
            domain: SearchDomain::Activity,
            hit_count: 3,
        };
        assert_eq!(
            serde_json::to_value(&event).expect("serialize"),
            serde_json::json!({
                "type": "domain_searched",
                "at": 7,
                "domain": "activity",
                "hitCount": 3
            })
        );
    }
}
