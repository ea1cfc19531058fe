// Copyright 2025 Cowboy AI, LLC.

//! Sales breakdowns by category and country

use crate::orders::OrderAggregate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Revenue attributed to one product category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySales {
    /// Category name
    pub category: String,
    /// Sum of order amounts
    pub revenue: f64,
    /// Percentage of total revenue, 0 when there is none
    pub share_percent: f64,
}

/// Order volume attributed to one country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryShare {
    /// Country name
    pub country: String,
    /// Number of orders
    pub order_count: usize,
    /// Percentage of all orders
    pub share_percent: f64,
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Revenue per category, largest first, ties by name
pub fn category_sales<'a>(
    orders: impl IntoIterator<Item = &'a OrderAggregate>,
) -> Vec<CategorySales> {
    let mut revenue: IndexMap<&str, f64> = IndexMap::new();
    for order in orders {
        *revenue.entry(order.category.as_str()).or_insert(0.0) += order.amount;
    }
    let total: f64 = revenue.values().sum();

    let mut sales: Vec<CategorySales> = revenue
        .into_iter()
        .map(|(category, revenue)| CategorySales {
            category: category.to_string(),
            revenue,
            share_percent: percent(revenue, total),
        })
        .collect();
    sales.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.category.cmp(&b.category))
    });
    sales
}

/// Order count per country, largest first, ties by name
pub fn country_shares<'a>(
    orders: impl IntoIterator<Item = &'a OrderAggregate>,
) -> Vec<CountryShare> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for order in orders {
        *counts.entry(order.country.as_str()).or_insert(0) += 1;
    }
    let total: usize = counts.values().sum();

    let mut shares: Vec<CountryShare> = counts
        .into_iter()
        .map(|(country, order_count)| CountryShare {
            country: country.to_string(),
            order_count,
            share_percent: percent(order_count as f64, total as f64),
        })
        .collect();
    shares.sort_by(|a, b| {
        b.order_count
            .cmp(&a.order_count)
            .then_with(|| a.country.cmp(&b.country))
    });
    shares
}
