//! Lookback growth metrics.

use crate::metric::{Metric, MetricCategory, cagr, lookback_value, pct_change};
use hearth_data::{MasterRecord, Measure};
use serde::{Deserialize, Serialize};

/// Configuration for a [`GrowthMetric`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthConfig {
    /// Measure whose growth is computed.
    pub measure: Measure,
    /// Lookback in months.
    pub lookback_months: u32,
    /// Annualize as a compound rate instead of reporting cumulative change.
    pub annualize: bool,
}

impl GrowthConfig {
    /// Cumulative change over `lookback_months`.
    pub const fn cumulative(measure: Measure, lookback_months: u32) -> Self {
        Self {
            measure,
            lookback_months,
            annualize: false,
        }
    }

    /// Compound annual rate over `lookback_months`.
    pub const fn annualized(measure: Measure, lookback_months: u32) -> Self {
        Self {
            measure,
            lookback_months,
            annualize: true,
        }
    }

    /// Growth between `previous` and `current` under this configuration.
    pub fn growth(&self, current: f64, previous: f64) -> Option<f64> {
        if self.annualize {
            cagr(current, previous, f64::from(self.lookback_months) / 12.0)
        } else {
            pct_change(current, previous)
        }
    }
}

/// Growth of one measure over a fixed lookback, per entity.
#[derive(Debug, Clone)]
pub struct GrowthMetric {
    name: &'static str,
    category: MetricCategory,
    measures: [Measure; 1],
    config: GrowthConfig,
}

impl GrowthMetric {
    /// Create a growth metric.
    pub const fn new(name: &'static str, category: MetricCategory, config: GrowthConfig) -> Self {
        Self {
            name,
            category,
            measures: [config.measure],
            config,
        }
    }

    /// Configuration.
    pub const fn config(&self) -> &GrowthConfig {
        &self.config
    }

    /// `value[t] / value[t-1] - 1` on home values.
    pub const fn price_mom() -> Self {
        Self::new(
            "price_mom",
            MetricCategory::Growth,
            GrowthConfig::cumulative(Measure::HomeValue, 1),
        )
    }

    /// `value[t] / value[t-12] - 1` on home values.
    pub const fn price_yoy() -> Self {
        Self::new(
            "price_yoy",
            MetricCategory::Growth,
            GrowthConfig::cumulative(Measure::HomeValue, 12),
        )
    }

    /// `(value[t] / value[t-36])^(1/3) - 1` on home values.
    pub const fn price_3y_cagr() -> Self {
        Self::new(
            "price_3y_cagr",
            MetricCategory::Growth,
            GrowthConfig::annualized(Measure::HomeValue, 36),
        )
    }

    /// Monthly rent change.
    pub const fn rent_mom() -> Self {
        Self::new(
            "rent_mom",
            MetricCategory::Rent,
            GrowthConfig::cumulative(Measure::Rent, 1),
        )
    }

    /// Year-over-year rent change.
    pub const fn rent_yoy() -> Self {
        Self::new(
            "rent_yoy",
            MetricCategory::Rent,
            GrowthConfig::cumulative(Measure::Rent, 12),
        )
    }

    /// Cumulative three-year rent change.
    pub const fn rent_3y_growth() -> Self {
        Self::new(
            "rent_3y_growth",
            MetricCategory::Rent,
            GrowthConfig::cumulative(Measure::Rent, 36),
        )
    }

    /// Cumulative three-year wage change.
    pub const fn wage_3y_growth() -> Self {
        Self::new(
            "wage_3y_growth",
            MetricCategory::Labor,
            GrowthConfig::cumulative(Measure::Wage, 36),
        )
    }

    /// Cumulative three-year employment change.
    pub const fn job_3y_growth() -> Self {
        Self::new(
            "job_3y_growth",
            MetricCategory::Labor,
            GrowthConfig::cumulative(Measure::Employment, 36),
        )
    }

    /// Year-over-year population change.
    pub const fn population_yoy() -> Self {
        Self::new(
            "population_yoy",
            MetricCategory::Demographic,
            GrowthConfig::cumulative(Measure::Population, 12),
        )
    }

    /// Year-over-year inventory change.
    pub const fn inventory_yoy() -> Self {
        Self::new(
            "inventory_yoy",
            MetricCategory::Supply,
            GrowthConfig::cumulative(Measure::Inventory, 12),
        )
    }
}

impl Metric for GrowthMetric {
    fn name(&self) -> &'static str {
        self.name
    }

    fn category(&self) -> MetricCategory {
        self.category
    }

    fn required_measures(&self) -> &[Measure] {
        &self.measures
    }

    fn lookback_months(&self) -> u32 {
        self.config.lookback_months
    }

    fn compute(&self, rows: &[MasterRecord], t: usize) -> Option<f64> {
        let measure = self.config.measure;
        let current = rows.get(t)?.get(measure)?;
        let previous = lookback_value(rows, t, measure, self.config.lookback_months)?;
        self.config.growth(current, previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use hearth_data::calendar::add_months;
    use hearth_geo::{CbsaCode, EntityKey};

    fn monthly(values: &[Option<f64>]) -> Vec<MasterRecord> {
        let entity = EntityKey::Metro(CbsaCode::parse("12420").unwrap());
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let mut record =
                    MasterRecord::new(entity.clone(), add_months(start, i as i32).unwrap());
                record.set_observed(Measure::HomeValue, *v);
                record
            })
            .collect()
    }

    #[test]
    fn test_yoy_is_exact() {
        let mut values = vec![None; 13];
        values[0] = Some(300_000.0);
        values[12] = Some(309_000.0);
        let rows = monthly(&values);
        assert_eq!(GrowthMetric::price_yoy().compute(&rows, 12), Some(0.03));
    }

    #[test]
    fn test_three_year_cagr() {
        let mut values = vec![None; 37];
        values[0] = Some(200_000.0);
        values[36] = Some(245_000.0);
        let rows = monthly(&values);
        let value = GrowthMetric::price_3y_cagr().compute(&rows, 36).unwrap();
        assert_relative_eq!(value, (245_000.0f64 / 200_000.0).powf(1.0 / 3.0) - 1.0);
    }

    #[test]
    fn test_missing_lookback_is_null() {
        let rows = monthly(&[Some(1.0), None, Some(3.0)]);
        let mom = GrowthMetric::price_mom();
        assert_eq!(mom.compute(&rows, 0), None);
        assert_eq!(mom.compute(&rows, 2), None);
        assert_eq!(GrowthMetric::price_yoy().compute(&rows, 2), None);
    }
}
