//! The metric abstraction.

use chrono::NaiveDate;
use hearth_data::calendar::add_months;
use hearth_data::{MasterRecord, Measure};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a metric says about a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    /// Price appreciation.
    Growth,
    /// Rent relative to price.
    Yield,
    /// Price relative to income or rent.
    Affordability,
    /// Population change.
    Demographic,
    /// Jobs and wages.
    Labor,
    /// Rent trends.
    Rent,
    /// For-sale supply.
    Supply,
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Growth => "growth",
            Self::Yield => "yield",
            Self::Affordability => "affordability",
            Self::Demographic => "demographic",
            Self::Labor => "labor",
            Self::Rent => "rent",
            Self::Supply => "supply",
        };
        f.write_str(label)
    }
}

/// A derived value computed per (entity, month).
///
/// Implementations see one entity's rows, sorted ascending by date, and the index
/// of the row being evaluated. They must not look at any other entity.
pub trait Metric: fmt::Debug + Send + Sync {
    /// Unique, stable column name.
    fn name(&self) -> &'static str;

    /// Category.
    fn category(&self) -> MetricCategory;

    /// Measures the metric reads.
    fn required_measures(&self) -> &[Measure];

    /// Longest lookback the metric needs, in months.
    fn lookback_months(&self) -> u32 {
        0
    }

    /// Value at `rows[t]`; `None` when any input is missing.
    fn compute(&self, rows: &[MasterRecord], t: usize) -> Option<f64>;
}

/// Value of `measure` exactly `months` before `rows[t]`, if that row exists and is
/// non-null. `rows` must be one entity's rows sorted by date.
pub fn lookback_value(rows: &[MasterRecord], t: usize, measure: Measure, months: u32) -> Option<f64> {
    let months = i32::try_from(months).ok()?;
    let target: NaiveDate = add_months(rows.get(t)?.date, -months)?;
    let idx = rows[..=t].binary_search_by_key(&target, |r| r.date).ok()?;
    rows[idx].get(measure)
}

/// Simple growth `(current - previous) / previous`. Requires a positive base.
pub fn pct_change(current: f64, previous: f64) -> Option<f64> {
    (previous > 0.0 && current.is_finite()).then(|| (current - previous) / previous)
}

/// Compound annual growth over `years`. Requires positive endpoints.
pub fn cagr(current: f64, previous: f64, years: f64) -> Option<f64> {
    (previous > 0.0 && current > 0.0 && years > 0.0)
        .then(|| (current / previous).powf(1.0 / years) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hearth_geo::{CbsaCode, EntityKey};

    fn rows() -> Vec<MasterRecord> {
        let entity = EntityKey::Metro(CbsaCode::parse("12420").unwrap());
        (1..=3)
            .map(|m| {
                MasterRecord::new(entity.clone(), NaiveDate::from_ymd_opt(2024, m, 1).unwrap())
                    .with(Measure::HomeValue, f64::from(m) * 100.0)
            })
            .collect()
    }

    #[test]
    fn test_lookback_value_is_date_based() {
        let rows = rows();
        assert_eq!(lookback_value(&rows, 2, Measure::HomeValue, 2), Some(100.0));
        assert_eq!(lookback_value(&rows, 2, Measure::HomeValue, 3), None);
        assert_eq!(lookback_value(&rows, 2, Measure::Rent, 1), None);
    }

    #[test]
    fn test_pct_change_exact() {
        assert_eq!(pct_change(309_000.0, 300_000.0), Some(0.03));
        assert_eq!(pct_change(1.0, 0.0), None);
    }

    #[test]
    fn test_cagr() {
        let value = cagr(245_000.0, 200_000.0, 3.0).unwrap();
        assert_relative_eq!(value, (1.225f64).powf(1.0 / 3.0) - 1.0);
        assert_relative_eq!(value, 0.07, epsilon = 1e-3);
    }
}
