#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hearth/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod export;
pub mod frame;
pub mod report;
pub mod rows;

pub use error::{ExportError, Result};
pub use export::{ExportFormat, Exporter};
pub use frame::{master_frame, ranking_frame};
pub use report::{ComparisonReport, DEFAULT_TOP_N};
pub use rows::{MasterRow, RankingRow, master_rows, ranking_rows};
