//! Error types for geographic key resolution.

use thiserror::Error;

/// Result type for geographic operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur while building or querying the crosswalk.
#[derive(Debug, Error)]
pub enum GeoError {
    /// The crosswalk table is absent or has no usable rows.
    #[error("County-to-CBSA crosswalk is missing or empty")]
    CrosswalkMissing,

    /// A key could not be resolved through the crosswalk or the name table.
    #[error("Unmapped {kind}: {key}")]
    Unmapped {
        /// What kind of key was looked up (e.g. "metro name").
        kind: &'static str,
        /// The key that failed to resolve.
        key: String,
    },

    /// A county FIPS code is malformed.
    #[error("Invalid county FIPS code: {0}")]
    InvalidFips(String),

    /// A CBSA code is malformed.
    #[error("Invalid CBSA code: {0}")]
    InvalidCbsa(String),
}

impl GeoError {
    /// Whether this error only affects a single row and should be recovered locally.
    pub const fn is_row_local(&self) -> bool {
        !matches!(self, Self::CrosswalkMissing)
    }
}
