#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hearth/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod calendar;
pub mod error;
pub mod fill;
pub mod frame;
pub mod frequency;
pub mod merge;
pub mod reshape;
pub mod series;
pub mod sources;

pub use error::{DataError, Result};
pub use frequency::{FrequencyNormalizer, NormalizeConfig, QuarterlyFill};
pub use merge::{
    Coverage, DatasetMerger, FillCounts, FillPolicy, MasterRecord, MasterTable, MergeConfig,
    MergeReport, SourceReport, SourceStatus,
};
pub use reshape::{LongRow, LongTable, SeriesReshaper};
pub use series::{Aggregation, Frequency, Measure, Observation, ObservationSeries};
pub use sources::{DropReport, KeyStrategy};
