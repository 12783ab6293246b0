#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hearth/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod compare;
pub mod engine;
pub mod error;
pub mod methodology;
pub mod normalize;
pub mod weights;
pub mod yield_estimate;

pub use compare::{
    BlendedRank, MethodologyComparison, RankChange, blended_ranking, compare_all, pearson,
    spearman,
};
pub use engine::{RawInputs, ScoreResult, ScoreTable, ScoringEngine};
pub use error::{Result, ScoreError};
pub use methodology::{ComponentScales, Methodology};
pub use normalize::{Normalization, Scale, display_rescale};
pub use weights::{Component, GrowthBlend, IncomeBlend, ScoringWeights};
pub use yield_estimate::{
    FallbackYield, ObservedYield, PriceTier, PriceTierYield, YieldConfidence, YieldEstimate,
    YieldEstimator,
};
