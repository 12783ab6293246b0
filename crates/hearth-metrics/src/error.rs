//! Error types for metric computation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for metric operations.
pub type Result<T> = std::result::Result<T, MetricError>;

/// Errors that can occur while computing metrics or snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricError {
    /// An entity lacks the lookback window a metric needs. Recorded per entity;
    /// the metric is null and the entity is kept.
    #[error(
        "{entity} has {available_months} months of history; {metric} needs {required_months}"
    )]
    InsufficientHistory {
        /// Entity key.
        entity: String,
        /// Metric name.
        metric: String,
        /// Months of history required.
        required_months: u32,
        /// Months of history available.
        available_months: u32,
    },

    /// The master table has no rows.
    #[error("Master table is empty")]
    EmptyMaster,

    /// A metric name is not registered.
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}
