// Copyright 2025 Cowboy AI, LLC.

//! Query parsing

use super::{ParsedQuery, SearchDomain, SearchIntent};

fn normalize_token(token: &str) -> String {
    token
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}

/// Split a free-text query into domain selectors and search terms
///
/// The first token naming a domain selects it; repeats are ignored. Every
/// other token becomes a term. With no domain named, all domains are searched.
pub fn parse_query(raw: &str) -> ParsedQuery {
    let raw = raw.trim();
    let mut terms = Vec::new();
    let mut intents: Vec<SearchIntent> = Vec::new();

    for token in raw.split_whitespace().map(normalize_token) {
        if token.is_empty() {
            continue;
        }
        match SearchDomain::from_token(&token) {
            Some(domain) if intents.iter().any(|i| i.domain == domain) => {}
            Some(domain) => intents.push(SearchIntent { domain, token }),
            None => terms.push(token),
        }
    }

    let selected_domains = if intents.is_empty() {
        SearchDomain::ALL.to_vec()
    } else {
        intents.iter().map(|i| i.domain).collect()
    };

    ParsedQuery {
        raw: raw.to_string(),
        terms,
        intents,
        selected_domains,
    }
}
