//! Cross-sectional normalization of component inputs.
//!
//! Every normalization maps one component's raw values across the candidate set
//! onto a common scale so that weighted sums are meaningful.

use crate::error::ScoreError;
use derive_more::Display;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Min-max score given to every entity when the input is constant.
pub const MIN_MAX_NEUTRAL: f64 = 50.0;

/// Standard deviations treated as the ends of the display range.
pub const DISPLAY_SIGMA: f64 = 3.0;

/// Normalization strategy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// `(x - min) / (max - min) * 100`.
    #[default]
    #[display("min_max")]
    MinMax,
    /// `(x - mean) / std` with the sample standard deviation.
    #[display("z_score")]
    ZScore,
}

impl Normalization {
    /// Normalize one component across the candidate set.
    pub fn normalize(self, values: &Array1<f64>) -> Array1<f64> {
        match self {
            Self::MinMax => min_max(values),
            Self::ZScore => z_score(values),
        }
    }
}

impl FromStr for Normalization {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "min_max" | "minmax" => Ok(Self::MinMax),
            "z_score" | "zscore" => Ok(Self::ZScore),
            _ => Err(ScoreError::UnknownNormalization(s.to_string())),
        }
    }
}

/// Min-max normalization onto `[0, 100]`.
///
/// The smallest input maps to exactly 0 and the largest to exactly 100. A
/// constant input maps to [`MIN_MAX_NEUTRAL`] for every entity.
pub fn min_max(values: &Array1<f64>) -> Array1<f64> {
    let min = values.fold(f64::INFINITY, |acc, &v| acc.min(v));
    let max = values.fold(f64::NEG_INFINITY, |acc, &v| acc.max(v));
    let range = max - min;
    if values.is_empty() || range == 0.0 || !range.is_finite() {
        return Array1::from_elem(values.len(), MIN_MAX_NEUTRAL);
    }
    values.mapv(|v| (v - min) / range * 100.0)
}

/// Z-score normalization using the sample standard deviation.
///
/// Fewer than two values, or zero dispersion, give 0 for every entity.
pub fn z_score(values: &Array1<f64>) -> Array1<f64> {
    if values.len() < 2 {
        return Array1::zeros(values.len());
    }
    let mean = values.mean().unwrap_or(0.0);
    let std = values.std(1.0);
    if std == 0.0 || !std.is_finite() {
        return Array1::zeros(values.len());
    }
    values.mapv(|v| (v - mean) / std)
}

/// Map a composite z-score onto `[0, 100]`, treating ±[`DISPLAY_SIGMA`] as the
/// extremes.
pub fn display_rescale(z: f64) -> f64 {
    ((z + DISPLAY_SIGMA) / (2.0 * DISPLAY_SIGMA) * 100.0).clamp(0.0, 100.0)
}

/// Transform applied to a raw component before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    /// Use the raw value.
    #[default]
    #[display("linear")]
    Linear,
    /// `ln(1 + x)`; undefined at or below -1.
    #[display("log")]
    Log,
}

impl Scale {
    /// Apply the transform. `None` when the value is outside the domain.
    pub fn apply(self, value: f64) -> Option<f64> {
        match self {
            Self::Linear => Some(value),
            Self::Log => (value > -1.0).then(|| value.ln_1p()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    #[test]
    fn test_min_max_bounds() {
        let scores = min_max(&array![3.0, -1.0, 7.0, 2.5]);
        assert_eq!(scores[1], 0.0);
        assert_eq!(scores[2], 100.0);
        assert!(scores.iter().all(|s| (0.0..=100.0).contains(s)));
        assert_relative_eq!(scores[0], 50.0);
    }

    #[test]
    fn test_constant_inputs() {
        assert_eq!(min_max(&array![4.0, 4.0, 4.0]), array![50.0, 50.0, 50.0]);
        assert_eq!(z_score(&array![4.0, 4.0, 4.0]), array![0.0, 0.0, 0.0]);
        assert_eq!(z_score(&array![4.0]), array![0.0]);
    }

    #[test]
    fn test_z_score_uses_sample_std() {
        let z = z_score(&array![1.0, 2.0, 3.0]);
        assert_relative_eq!(z[0], -1.0);
        assert_relative_eq!(z[1], 0.0);
        assert_relative_eq!(z[2], 1.0);
    }

    #[rstest]
    #[case(0.0, 50.0)]
    #[case(3.0, 100.0)]
    #[case(-1.5, 25.0)]
    #[case(4.2, 100.0)]
    #[case(-7.0, 0.0)]
    fn test_display_rescale(#[case] z: f64, #[case] expected: f64) {
        assert_relative_eq!(display_rescale(z), expected);
    }

    #[rstest]
    #[case("min_max", Normalization::MinMax)]
    #[case("MinMax", Normalization::MinMax)]
    #[case("z-score", Normalization::ZScore)]
    #[case(" zscore ", Normalization::ZScore)]
    fn test_parse_normalization(#[case] raw: &str, #[case] expected: Normalization) {
        assert_eq!(raw.parse::<Normalization>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_normalization() {
        assert_eq!(
            "rank".parse::<Normalization>(),
            Err(ScoreError::UnknownNormalization("rank".to_string()))
        );
    }

    #[test]
    fn test_log_scale_domain() {
        assert_relative_eq!(Scale::Log.apply(0.1).unwrap(), 1.1f64.ln());
        assert_eq!(Scale::Log.apply(-1.0), None);
        assert_eq!(Scale::Linear.apply(-3.0), Some(-3.0));
    }
}
