//! Rental yield estimators.
//!
//! Rent coverage is patchy, so the income component may have to fall back to a
//! heuristic. Every estimate says how it was obtained so a ranking can show which
//! yields were observed and which were assumed.

use derive_more::Display;
use hearth_data::Measure;
use hearth_metrics::{Metric, MetricSnapshot, RentalYield};
use serde::{Deserialize, Serialize};

/// How a yield was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YieldConfidence {
    /// Computed from rent and price data.
    #[display("observed")]
    Observed,
    /// Assumed from a heuristic.
    #[display("estimated")]
    Estimated,
}

/// A gross rental yield with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldEstimate {
    /// Annual rent over price, as a fraction.
    pub value: f64,
    /// Provenance.
    pub confidence: YieldConfidence,
}

impl YieldEstimate {
    /// Yield computed from data.
    pub const fn observed(value: f64) -> Self {
        Self {
            value,
            confidence: YieldConfidence::Observed,
        }
    }

    /// Yield assumed from a heuristic.
    pub const fn estimated(value: f64) -> Self {
        Self {
            value,
            confidence: YieldConfidence::Estimated,
        }
    }

    /// Whether the yield is a heuristic.
    pub fn is_estimated(&self) -> bool {
        self.confidence == YieldConfidence::Estimated
    }
}

/// Produces a rental yield for a snapshot.
pub trait YieldEstimator: std::fmt::Debug + Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Yield for `snapshot`, if this estimator can produce one.
    fn estimate(&self, snapshot: &MetricSnapshot) -> Option<YieldEstimate>;
}

/// Yield from the snapshot's rent and price.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservedYield;

impl YieldEstimator for ObservedYield {
    fn name(&self) -> &'static str {
        "observed"
    }

    fn estimate(&self, snapshot: &MetricSnapshot) -> Option<YieldEstimate> {
        snapshot
            .metric(RentalYield.name())
            .or_else(|| {
                let price = snapshot.price().filter(|p| *p > 0.0)?;
                let rent = snapshot.value(Measure::Rent).filter(|r| *r > 0.0)?;
                Some(rent * 12.0 / price)
            })
            .map(YieldEstimate::observed)
    }
}

/// One band of [`PriceTierYield`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceTier {
    /// Exclusive upper bound on the home value.
    pub below: f64,
    /// Assumed yield for prices in the band.
    pub rental_yield: f64,
}

/// Assumed yield by home-value band: cheaper markets yield more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTierYield {
    /// Bands in increasing order of `below`.
    pub tiers: Vec<PriceTier>,
    /// Yield above the last band.
    pub top_yield: f64,
}

impl Default for PriceTierYield {
    fn default() -> Self {
        let tier = |below, rental_yield| PriceTier {
            below,
            rental_yield,
        };
        Self {
            tiers: vec![
                tier(350_000.0, 0.065),
                tier(450_000.0, 0.060),
                tier(550_000.0, 0.055),
                tier(700_000.0, 0.050),
            ],
            top_yield: 0.045,
        }
    }
}

impl PriceTierYield {
    /// Assumed yield for a home value.
    pub fn yield_for(&self, price: f64) -> f64 {
        self.tiers
            .iter()
            .find(|tier| price < tier.below)
            .map_or(self.top_yield, |tier| tier.rental_yield)
    }
}

impl YieldEstimator for PriceTierYield {
    fn name(&self) -> &'static str {
        "price_tier"
    }

    fn estimate(&self, snapshot: &MetricSnapshot) -> Option<YieldEstimate> {
        let price = snapshot.price().filter(|p| *p > 0.0)?;
        Some(YieldEstimate::estimated(self.yield_for(price)))
    }
}

/// Tries each estimator in order; the first that produces a value wins.
#[derive(Debug)]
pub struct FallbackYield {
    estimators: Vec<Box<dyn YieldEstimator>>,
}

impl Default for FallbackYield {
    /// Observed yield, then the price-tier heuristic.
    fn default() -> Self {
        Self::new(vec![
            Box::new(ObservedYield),
            Box::new(PriceTierYield::default()),
        ])
    }
}

impl FallbackYield {
    /// Chain of estimators.
    pub fn new(estimators: Vec<Box<dyn YieldEstimator>>) -> Self {
        Self { estimators }
    }

    /// Names of the chained estimators, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.estimators.iter().map(|e| e.name()).collect()
    }
}

impl YieldEstimator for FallbackYield {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn estimate(&self, snapshot: &MetricSnapshot) -> Option<YieldEstimate> {
        self.estimators.iter().find_map(|e| e.estimate(snapshot))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use hearth_data::Coverage;
    use hearth_geo::{CbsaCode, EntityKey};
    use rstest::rstest;
    use std::collections::BTreeMap;

    pub(crate) fn snapshot(code: &str, price: f64, rent: Option<f64>) -> MetricSnapshot {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut values = [None; Measure::COUNT];
        values[Measure::HomeValue.index()] = Some(price);
        values[Measure::Rent.index()] = rent;
        MetricSnapshot {
            entity: EntityKey::Metro(CbsaCode::parse(code).unwrap()),
            date,
            last_observed: date,
            history_months: 36,
            full_history: true,
            values,
            coverage: [Coverage::Observed; Measure::COUNT],
            metrics: BTreeMap::new(),
            issues: Vec::new(),
        }
    }

    #[rstest]
    #[case(250_000.0, 0.065)]
    #[case(350_000.0, 0.060)]
    #[case(449_999.0, 0.060)]
    #[case(600_000.0, 0.050)]
    #[case(1_200_000.0, 0.045)]
    fn test_price_tiers(#[case] price: f64, #[case] expected: f64) {
        assert_relative_eq!(PriceTierYield::default().yield_for(price), expected);
    }

    #[test]
    fn test_observed_yield_from_values() {
        let estimate = ObservedYield
            .estimate(&snapshot("12420", 400_000.0, Some(2_000.0)))
            .unwrap();
        assert_relative_eq!(estimate.value, 0.06);
        assert_eq!(estimate.confidence, YieldConfidence::Observed);
        assert!(ObservedYield.estimate(&snapshot("12420", 400_000.0, None)).is_none());
    }

    #[test]
    fn test_fallback_marks_estimates() {
        let fallback = FallbackYield::default();
        assert_eq!(fallback.names(), vec!["observed", "price_tier"]);

        let observed = fallback.estimate(&snapshot("12420", 400_000.0, Some(2_500.0))).unwrap();
        assert!(!observed.is_estimated());

        let assumed = fallback.estimate(&snapshot("12420", 400_000.0, None)).unwrap();
        assert!(assumed.is_estimated());
        assert_relative_eq!(assumed.value, 0.060);
    }
}
