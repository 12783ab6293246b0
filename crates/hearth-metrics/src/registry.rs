//! Metric Registry
//!
//! Central registry for all available metrics. Allows lookup and instantiation by
//! name.

use crate::growth::GrowthMetric;
use crate::metric::{Metric, MetricCategory};
use crate::ratio::{PriceToRent, RentalYield, SpreadMetric};
use std::collections::HashMap;

/// Metric metadata
#[derive(Debug, Clone)]
pub struct MetricInfo {
    /// Metric name (unique identifier)
    pub name: &'static str,
    /// Metric category
    pub category: MetricCategory,
    /// Brief description of what the metric measures
    pub description: &'static str,
    /// Longest lookback in months
    pub lookback_months: u32,
}

/// Get all available metric info
pub fn available_metrics() -> Vec<MetricInfo> {
    vec![
        // Price growth
        MetricInfo {
            name: "price_mom",
            category: MetricCategory::Growth,
            description: "Home value change over one month",
            lookback_months: 1,
        },
        MetricInfo {
            name: "price_yoy",
            category: MetricCategory::Growth,
            description: "Home value change over twelve months",
            lookback_months: 12,
        },
        MetricInfo {
            name: "price_3y_cagr",
            category: MetricCategory::Growth,
            description: "Compound annual home value growth over three years",
            lookback_months: 36,
        },
        // Yield and affordability
        MetricInfo {
            name: "rental_yield",
            category: MetricCategory::Yield,
            description: "Annual rent divided by home value",
            lookback_months: 0,
        },
        MetricInfo {
            name: "price_to_rent",
            category: MetricCategory::Affordability,
            description: "Home value divided by annual rent",
            lookback_months: 0,
        },
        // Rent
        MetricInfo {
            name: "rent_mom",
            category: MetricCategory::Rent,
            description: "Rent change over one month",
            lookback_months: 1,
        },
        MetricInfo {
            name: "rent_yoy",
            category: MetricCategory::Rent,
            description: "Rent change over twelve months",
            lookback_months: 12,
        },
        MetricInfo {
            name: "rent_3y_growth",
            category: MetricCategory::Rent,
            description: "Cumulative rent change over three years",
            lookback_months: 36,
        },
        MetricInfo {
            name: "rent_gap_proxy",
            category: MetricCategory::Rent,
            description: "Three-year price CAGR minus three-year rent growth",
            lookback_months: 36,
        },
        // Labor
        MetricInfo {
            name: "wage_3y_growth",
            category: MetricCategory::Labor,
            description: "Cumulative wage change over three years",
            lookback_months: 36,
        },
        MetricInfo {
            name: "job_3y_growth",
            category: MetricCategory::Labor,
            description: "Cumulative employment change over three years",
            lookback_months: 36,
        },
        // Demographics and supply
        MetricInfo {
            name: "population_yoy",
            category: MetricCategory::Demographic,
            description: "Population change over twelve months",
            lookback_months: 12,
        },
        MetricInfo {
            name: "inventory_yoy",
            category: MetricCategory::Supply,
            description: "For-sale inventory change over twelve months",
            lookback_months: 12,
        },
    ]
}

/// Instantiate a metric by name
pub fn create_metric(name: &str) -> Option<Box<dyn Metric>> {
    let metric: Box<dyn Metric> = match name {
        "price_mom" => Box::new(GrowthMetric::price_mom()),
        "price_yoy" => Box::new(GrowthMetric::price_yoy()),
        "price_3y_cagr" => Box::new(GrowthMetric::price_3y_cagr()),
        "rental_yield" => Box::new(RentalYield),
        "price_to_rent" => Box::new(PriceToRent),
        "rent_mom" => Box::new(GrowthMetric::rent_mom()),
        "rent_yoy" => Box::new(GrowthMetric::rent_yoy()),
        "rent_3y_growth" => Box::new(GrowthMetric::rent_3y_growth()),
        "rent_gap_proxy" => Box::new(SpreadMetric::rent_gap_proxy()),
        "wage_3y_growth" => Box::new(GrowthMetric::wage_3y_growth()),
        "job_3y_growth" => Box::new(GrowthMetric::job_3y_growth()),
        "population_yoy" => Box::new(GrowthMetric::population_yoy()),
        "inventory_yoy" => Box::new(GrowthMetric::inventory_yoy()),
        _ => return None,
    };
    Some(metric)
}

/// Get metrics by category
pub fn metrics_by_category(category: MetricCategory) -> Vec<MetricInfo> {
    available_metrics()
        .into_iter()
        .filter(|m| m.category == category)
        .collect()
}

/// Get metric info by name
pub fn get_metric_info(name: &str) -> Option<MetricInfo> {
    available_metrics().into_iter().find(|m| m.name == name)
}

/// List all metric names
pub fn list_metric_names() -> Vec<&'static str> {
    available_metrics().into_iter().map(|m| m.name).collect()
}

/// Count metrics by category
pub fn count_by_category() -> HashMap<MetricCategory, usize> {
    let mut counts = HashMap::new();
    for metric in available_metrics() {
        *counts.entry(metric.category).or_insert(0) += 1;
    }
    counts
}
