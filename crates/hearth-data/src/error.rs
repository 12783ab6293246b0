//! Error types for data harmonization.

use crate::series::Measure;
use hearth_geo::GeoError;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while reshaping, normalizing or merging sources.
#[derive(Debug, Error)]
pub enum DataError {
    /// A required source table is absent.
    #[error("Required source is missing: {0}")]
    MissingSource(Measure),

    /// A step produced no rows.
    #[error("{step} produced no rows (required: {required})")]
    EmptyResult {
        /// Source or step that came back empty.
        step: String,
        /// Whether the run can continue without it.
        required: bool,
    },

    /// The series handed to the merger as its base is not a home-value series.
    #[error("Invalid merge base: {0}")]
    InvalidBase(String),

    /// A column the adapter depends on is not present.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A value could not be parsed.
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// A series passed to the merger is not on the month-start calendar.
    #[error("Series {0} is not normalized to month-start dates")]
    NotMonthly(Measure),

    /// Crosswalk error.
    #[error("Geography error: {0}")]
    Geo(#[from] GeoError),

    /// Polars error.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

impl DataError {
    /// Whether the pipeline must stop.
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::EmptyResult { required, .. } => *required,
            Self::Geo(err) => !err.is_row_local(),
            _ => true,
        }
    }
}
