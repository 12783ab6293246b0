#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/hearth/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod codes;
pub mod entity;
pub mod error;
pub mod names;
pub mod resolver;

pub use codes::{CbsaCode, Fips, zero_pad};
pub use entity::{EntityKey, GeoLevel, GeographicEntity};
pub use error::{GeoError, Result};
pub use resolver::{CrosswalkReport, CrosswalkRow, GeoKeyResolver};
