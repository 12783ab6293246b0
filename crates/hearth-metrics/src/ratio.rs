//! Rent-to-price ratios and the rent gap spread.

use crate::metric::{Metric, MetricCategory};
use hearth_data::{MasterRecord, Measure};

const PRICE_AND_RENT: [Measure; 2] = [Measure::HomeValue, Measure::Rent];

fn price_and_annual_rent(record: &MasterRecord) -> Option<(f64, f64)> {
    let price = record.get(Measure::HomeValue).filter(|p| *p > 0.0)?;
    let rent = record.get(Measure::Rent).filter(|r| *r > 0.0)?;
    Some((price, rent * 12.0))
}

/// Gross rental yield, `(monthly_rent * 12) / home_value`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RentalYield;

impl Metric for RentalYield {
    fn name(&self) -> &'static str {
        "rental_yield"
    }

    fn category(&self) -> MetricCategory {
        MetricCategory::Yield
    }

    fn required_measures(&self) -> &[Measure] {
        &PRICE_AND_RENT
    }

    fn compute(&self, rows: &[MasterRecord], t: usize) -> Option<f64> {
        let (price, annual_rent) = price_and_annual_rent(rows.get(t)?)?;
        Some(annual_rent / price)
    }
}

/// Price-to-rent ratio, `home_value / (monthly_rent * 12)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceToRent;

impl Metric for PriceToRent {
    fn name(&self) -> &'static str {
        "price_to_rent"
    }

    fn category(&self) -> MetricCategory {
        MetricCategory::Affordability
    }

    fn required_measures(&self) -> &[Measure] {
        &PRICE_AND_RENT
    }

    fn compute(&self, rows: &[MasterRecord], t: usize) -> Option<f64> {
        let (price, annual_rent) = price_and_annual_rent(rows.get(t)?)?;
        Some(price / annual_rent)
    }
}

/// Difference of two metrics at the same row, `left - right`.
///
/// The rent gap proxy (`price_3y_cagr - rent_3y_growth`) is positive when prices
/// outrun rents.
#[derive(Debug)]
pub struct SpreadMetric {
    name: &'static str,
    category: MetricCategory,
    left: Box<dyn Metric>,
    right: Box<dyn Metric>,
    measures: Vec<Measure>,
}

impl SpreadMetric {
    /// Spread `left - right`.
    pub fn new(
        name: &'static str,
        category: MetricCategory,
        left: Box<dyn Metric>,
        right: Box<dyn Metric>,
    ) -> Self {
        let mut measures: Vec<Measure> = left
            .required_measures()
            .iter()
            .chain(right.required_measures())
            .copied()
            .collect();
        measures.sort();
        measures.dedup();
        Self {
            name,
            category,
            left,
            right,
            measures,
        }
    }

    /// `price_3y_cagr - rent_3y_growth`.
    pub fn rent_gap_proxy() -> Self {
        Self::new(
            "rent_gap_proxy",
            MetricCategory::Rent,
            Box::new(crate::growth::GrowthMetric::price_3y_cagr()),
            Box::new(crate::growth::GrowthMetric::rent_3y_growth()),
        )
    }
}

impl Metric for SpreadMetric {
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
        self.left.lookback_months().max(self.right.lookback_months())
    }

    fn compute(&self, rows: &[MasterRecord], t: usize) -> Option<f64> {
        Some(self.left.compute(rows, t)? - self.right.compute(rows, t)?)
    }
}
