//! Adapters that turn raw provider extracts into observation series.
//!
//! Each adapter takes an in-memory [`polars::prelude::DataFrame`] exactly as the
//! provider publishes it and returns an [`ObservationSeries`](crate::ObservationSeries)
//! plus a [`DropReport`] of rows it could not key.

pub mod bls;
pub mod census;
pub mod crosswalk;
pub mod fhfa;
pub mod freddie;
pub mod keys;
pub mod zillow;

pub use bls::{BlsAdapter, BlsPeriod, BlsProgram, BlsSeriesId};
pub use census::CensusPopulationAdapter;
pub use crosswalk::{crosswalk_rows, load_resolver};
pub use fhfa::FhfaAdapter;
pub use freddie::FreddieMacAdapter;
pub use keys::{DropReport, KeyStrategy, long_to_series};
pub use zillow::{ZillowAdapter, ZillowGeography};
