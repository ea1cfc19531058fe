// Copyright 2025 Cowboy AI, LLC.

//! Global search: fan-out, merge and rank

use super::{
    parse_query, DomainSearchProvider, GlobalSearchHit, SearchDomain, SearchEventBus,
    SearchExecutionResult, SearchTriggerEvent,
};
use chrono::Utc;
use indexmap::IndexMap;
use std::time::Instant;
use tracing::debug;

/// Fans a parsed query out to per-domain providers
pub struct GlobalSearchService<'a> {
    providers: IndexMap<SearchDomain, Box<dyn DomainSearchProvider + 'a>>,
    bus: &'a SearchEventBus,
    max_hits: usize,
}

impl<'a> GlobalSearchService<'a> {
    /// Create a service with no providers
    pub fn new(bus: &'a SearchEventBus, max_hits: usize) -> Self {
        Self {
            providers: IndexMap::new(),
            bus,
            max_hits,
        }
    }

    /// Register a provider, replacing any other for the same domain
    pub fn with_provider(mut self, provider: impl DomainSearchProvider + 'a) -> Self {
        self.providers.insert(provider.domain(), Box::new(provider));
        self
    }

    /// Run a query
    ///
    /// Publishes `QueryStarted`, one `DomainSearched` per provider invoked and
    /// `QueryCompleted`, in that order.
    pub fn search(&self, raw_query: &str) -> SearchExecutionResult {
        let started = Instant::now();
        let parsed = parse_query(raw_query);

        self.bus.publish(SearchTriggerEvent::QueryStarted {
            at: Utc::now().timestamp_millis(),
            query: parsed.raw.clone(),
            domains: parsed.selected_domains.clone(),
        });

        let mut hits: Vec<GlobalSearchHit> = Vec::new();
        for domain in &parsed.selected_domains {
            let Some(provider) = self.providers.get(domain) else {
                debug!(domain = %domain, "No search provider registered");
                continue;
            };
            let domain_hits = provider.search(&parsed);
            self.bus.publish(SearchTriggerEvent::DomainSearched {
                at: Utc::now().timestamp_millis(),
                domain: *domain,
                hit_count: domain_hits.len(),
            });
            hits.extend(domain_hits);
        }

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| b.at.cmp(&a.at)));
        hits.truncate(self.max_hits);

        let took_ms = (started.elapsed().as_secs_f64() * 1_000.0).round().max(1.0) as u64;

        self.bus.publish(SearchTriggerEvent::QueryCompleted {
            at: Utc::now().timestamp_millis(),
            query: parsed.raw.clone(),
            total_hits: hits.len(),
            took_ms,
        });

        debug!(
            query = %parsed.raw,
            total_hits = hits.len(),
            took_ms,
            "Search completed"
        );

        SearchExecutionResult {
            hits,
            took_ms,
            selected_domains: parsed.selected_domains,
            terms: parsed.terms,
        }
    }
}
