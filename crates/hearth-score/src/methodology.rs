//! Named scoring methodologies.
//!
//! A methodology bundles everything a scoring run needs besides the snapshots:
//! normalization, component weights, sub-blends and per-component scaling. The
//! presets reproduce the methodologies the ranking reports have used.

use crate::error::{Result, ScoreError};
use crate::normalize::{Normalization, Scale};
use crate::weights::{Component, GrowthBlend, IncomeBlend, ScoringWeights};
use serde::{Deserialize, Serialize};

/// Name of the min-max preset.
pub const BALANCED: &str = "balanced";
/// Name of the z-score preset.
pub const Z_SCORE: &str = "z_score";
/// Name of the income-focused preset.
pub const INCOME: &str = "income";

/// Scale applied to each component before normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentScales {
    /// Applied to the home value, before negation.
    pub affordability: Scale,
    /// Applied to the blended growth rate.
    pub growth: Scale,
    /// Applied to population growth.
    pub demographic: Scale,
    /// Applied to the blended income rate.
    pub income: Scale,
}

impl ComponentScales {
    /// Scale of one component.
    pub const fn scale(&self, component: Component) -> Scale {
        match component {
            Component::Affordability => self.affordability,
            Component::Growth => self.growth,
            Component::Demographic => self.demographic,
            Component::Income => self.income,
        }
    }
}

/// A complete scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Methodology {
    /// Name used in reports and output columns.
    pub name: String,
    /// Normalization applied to every component.
    pub normalization: Normalization,
    /// Component weights.
    pub weights: ScoringWeights,
    /// Growth sub-weights.
    pub growth: GrowthBlend,
    /// Income sub-weights.
    pub income: IncomeBlend,
    /// Per-component scaling.
    pub scales: ComponentScales,
    /// Map the composite z-score to 0..100 for display. Ignored for min-max.
    pub rescale_display: bool,
    /// Use YoY growth in place of a missing 3-year CAGR.
    pub cagr_fallback: bool,
}

impl Default for Methodology {
    fn default() -> Self {
        Self::balanced()
    }
}

impl Methodology {
    /// Min-max scoring weighted toward growth momentum.
    ///
    /// Affordability 30%, growth 40% (70% YoY, 30% CAGR), demographics 20%,
    /// yield 10%.
    pub fn balanced() -> Self {
        Self {
            name: BALANCED.to_string(),
            normalization: Normalization::MinMax,
            weights: ScoringWeights::default(),
            growth: GrowthBlend::momentum(),
            income: IncomeBlend::yield_only(),
            scales: ComponentScales::default(),
            rescale_display: false,
            cagr_fallback: false,
        }
    }

    /// Z-score scoring weighted toward the long-run trend.
    ///
    /// Growth 50% (70% CAGR, 30% YoY), affordability 25%, demographics 15%,
    /// yield 10%.
    pub fn z_score() -> Self {
        Self {
            name: Z_SCORE.to_string(),
            normalization: Normalization::ZScore,
            weights: ScoringWeights {
                affordability: 0.25,
                growth: 0.50,
                demographic: 0.15,
                income: 0.10,
            },
            growth: GrowthBlend::trend(),
            income: IncomeBlend::yield_only(),
            scales: ComponentScales::default(),
            rescale_display: true,
            cagr_fallback: true,
        }
    }

    /// Like [`Self::z_score`], with rent growth folded into the income
    /// component.
    pub fn income() -> Self {
        Self {
            name: INCOME.to_string(),
            income: IncomeBlend::with_rent_growth(),
            ..Self::z_score()
        }
    }

    /// Every preset.
    pub fn presets() -> Vec<Self> {
        vec![Self::balanced(), Self::z_score(), Self::income()]
    }

    /// Preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        Self::presets().into_iter().find(|m| m.name == name)
    }

    /// Rename the methodology.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the weights.
    pub const fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Replace the normalization.
    pub const fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Replace the component scales.
    pub const fn with_scales(mut self, scales: ComponentScales) -> Self {
        self.scales = scales;
        self
    }

    /// Check weights and blends.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ScoreError::Configuration(
                "methodology name is empty".to_string(),
            ));
        }
        self.weights.validate()?;
        self.growth.validate()?;
        self.income.validate()
    }
}
