//! Error type for end-to-end runs.

use hearth_data::DataError;
use hearth_geo::GeoError;
use hearth_metrics::MetricError;
use hearth_output::ExportError;
use hearth_score::ScoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that stop a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid pipeline configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A source file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying polars error.
        source: polars::prelude::PolarsError,
    },

    /// Geography error.
    #[error(transparent)]
    Geo(#[from] GeoError),

    /// Data harmonization error.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Metric computation error.
    #[error(transparent)]
    Metric(#[from] MetricError),

    /// Scoring error.
    #[error(transparent)]
    Score(#[from] ScoreError),

    /// Export error.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
