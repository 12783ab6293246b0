//! Component weights and sub-blends.

use crate::error::{Result, ScoreError};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Allowed distance between a weight sum and 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// A scored component of the composite.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    /// Inverse of the home value.
    #[display("affordability")]
    Affordability,
    /// Blend of YoY price growth and the 3-year price CAGR.
    #[display("growth")]
    Growth,
    /// Population growth.
    #[display("demographic")]
    Demographic,
    /// Blend of rental yield and rent growth.
    #[display("income")]
    Income,
}

impl Component {
    /// Number of components.
    pub const COUNT: usize = 4;

    /// Every component, in column order.
    pub const ALL: [Self; Self::COUNT] =
        [Self::Affordability, Self::Growth, Self::Demographic, Self::Income];

    /// Position in [`Self::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

fn check_sum(label: &str, parts: &[f64]) -> Result<()> {
    if let Some(negative) = parts.iter().find(|w| **w < 0.0 || !w.is_finite()) {
        return Err(ScoreError::Configuration(format!(
            "{label} weight must be a non-negative number, got {negative}"
        )));
    }
    let sum: f64 = parts.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(ScoreError::InvalidWeights { sum });
    }
    Ok(())
}

/// Weights of the four components in the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Affordability weight.
    pub affordability: f64,
    /// Growth weight.
    pub growth: f64,
    /// Demographic weight.
    pub demographic: f64,
    /// Yield/income weight.
    #[serde(alias = "yield")]
    pub income: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            affordability: 0.30,
            growth: 0.40,
            demographic: 0.20,
            income: 0.10,
        }
    }
}

impl ScoringWeights {
    /// Weights from the four components, validated.
    pub fn new(affordability: f64, growth: f64, demographic: f64, income: f64) -> Result<Self> {
        let weights = Self {
            affordability,
            growth,
            demographic,
            income,
        };
        weights.validate()?;
        Ok(weights)
    }

    /// Weight of one component.
    pub const fn weight(&self, component: Component) -> f64 {
        match component {
            Component::Affordability => self.affordability,
            Component::Growth => self.growth,
            Component::Demographic => self.demographic,
            Component::Income => self.income,
        }
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        Component::ALL.iter().map(|c| self.weight(*c)).sum()
    }

    /// Check that every weight is non-negative and the sum is 1.0 within
    /// [`WEIGHT_TOLERANCE`]. Weights are never renormalized.
    pub fn validate(&self) -> Result<()> {
        check_sum("component", &Component::ALL.map(|c| self.weight(c)))
    }
}

/// Sub-weights of the growth component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthBlend {
    /// Weight on year-over-year price growth.
    pub yoy: f64,
    /// Weight on the 3-year price CAGR.
    pub cagr: f64,
}

impl Default for GrowthBlend {
    fn default() -> Self {
        Self::momentum()
    }
}

impl GrowthBlend {
    /// Recent momentum first: 70% YoY, 30% CAGR.
    pub const fn momentum() -> Self {
        Self { yoy: 0.7, cagr: 0.3 }
    }

    /// Proven track record first: 70% CAGR, 30% YoY.
    pub const fn trend() -> Self {
        Self { yoy: 0.3, cagr: 0.7 }
    }

    /// Must sum to 1.0.
    pub fn validate(&self) -> Result<()> {
        check_sum("growth blend", &[self.yoy, self.cagr])
    }
}

/// Sub-weights of the income component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeBlend {
    /// Weight on the gross rental yield.
    pub rental_yield: f64,
    /// Weight on year-over-year rent growth.
    pub rent_growth: f64,
}

impl Default for IncomeBlend {
    fn default() -> Self {
        Self::yield_only()
    }
}

impl IncomeBlend {
    /// Rental yield alone.
    pub const fn yield_only() -> Self {
        Self {
            rental_yield: 1.0,
            rent_growth: 0.0,
        }
    }

    /// Two thirds yield, one third rent growth.
    pub const fn with_rent_growth() -> Self {
        Self {
            rental_yield: 0.67,
            rent_growth: 0.33,
        }
    }

    /// Must sum to 1.0.
    pub fn validate(&self) -> Result<()> {
        check_sum("income blend", &[self.rental_yield, self.rent_growth])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_weights_are_valid() {
        assert!(ScoringWeights::default().validate().is_ok());
        assert!(GrowthBlend::trend().validate().is_ok());
        assert!(IncomeBlend::with_rent_growth().validate().is_ok());
    }

    #[rstest]
    #[case(0.30, 0.40, 0.20, 0.20)]
    #[case(0.25, 0.25, 0.25, 0.20)]
    #[case(0.30, 0.40, 0.20, 0.10 + 2e-9)]
    fn test_rejects_bad_sums(
        #[case] affordability: f64,
        #[case] growth: f64,
        #[case] demographic: f64,
        #[case] income: f64,
    ) {
        let err = ScoringWeights::new(affordability, growth, demographic, income).unwrap_err();
        assert!(matches!(err, ScoreError::InvalidWeights { .. }));
    }

    #[test]
    fn test_accepts_rounding_noise() {
        assert!(ScoringWeights::new(0.1 + 0.2, 0.4, 0.2, 0.1).is_ok());
    }

    #[test]
    fn test_rejects_negative_weight() {
        let err = ScoringWeights::new(1.2, -0.2, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, ScoreError::Configuration(_)));
    }

    #[test]
    fn test_yield_alias() {
        let weights: ScoringWeights = serde_json::from_str(
            r#"{"affordability": 0.3, "growth": 0.4, "demographic": 0.2, "yield": 0.1}"#,
        )
        .unwrap();
        assert_eq!(weights.income, 0.1);
    }
}
