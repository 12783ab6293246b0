#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hearth/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod pipeline;

// Re-export main types from sub-crates
pub use hearth_data as data;
pub use hearth_geo as geo;
pub use hearth_metrics as metrics;
pub use hearth_output as output;
pub use hearth_score as score;

pub use config::{PipelineConfig, SourceFile, SourceKind};
pub use error::{PipelineError, Result};
pub use pipeline::{
    Pipeline, PipelineInputs, PipelineOutput, SourceDrops, SourceTable, read_csv,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
