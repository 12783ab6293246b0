//! Error types for scoring.

use thiserror::Error;

/// Result type for scoring operations.
pub type Result<T> = std::result::Result<T, ScoreError>;

/// Errors that can occur while scoring or comparing methodologies.
///
/// All of these are configuration or call-site errors and are never corrected
/// silently.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    /// A methodology setting is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Component weights do not sum to one.
    #[error("Weights must sum to 1.0, got {sum}")]
    InvalidWeights {
        /// Actual sum.
        sum: f64,
    },

    /// A normalization name was not recognized.
    #[error("Unknown normalization: {0}")]
    UnknownNormalization(String),

    /// There is nothing to score.
    #[error("No snapshots to score")]
    EmptySnapshot,

    /// Two score tables do not cover the same entities.
    #[error("Score tables cover different entities: {0}")]
    MismatchedTables(String),
}
