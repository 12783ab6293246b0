#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hearth/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod growth;
pub mod metric;
pub mod ratio;
pub mod registry;
pub mod snapshot;

pub use engine::{MetricEngine, MetricTable};
pub use error::{MetricError, Result};
pub use growth::{GrowthConfig, GrowthMetric};
pub use metric::{Metric, MetricCategory, cagr, lookback_value, pct_change};
pub use ratio::{PriceToRent, RentalYield, SpreadMetric};
pub use registry::{
    MetricInfo, available_metrics, create_metric, get_metric_info, metrics_by_category,
};
pub use snapshot::{
    Lookbacks, MetricSnapshot, SnapshotBuilder, SnapshotConfig, SnapshotReport, SnapshotSet,
};
