//! Census Bureau county population estimates.
//!
//! One row per county with `STATE`, `COUNTY` and a `POPESTIMATE<year>` column per
//! vintage year. Rows with county code `000` are state totals.

use super::keys::DropReport;
use crate::error::{DataError, Result};
use crate::frame::{float_values, require_columns, string_values};
use crate::series::{Frequency, Measure, Observation, ObservationSeries};
use chrono::NaiveDate;
use hearth_geo::{Fips, zero_pad};
use polars::prelude::*;
use tracing::info;

/// Prefix of the yearly estimate columns.
pub const ESTIMATE_PREFIX: &str = "POPESTIMATE";

/// Year of a `POPESTIMATE<yyyy>` header. Other estimate columns (such as the
/// April base `POPESTIMATE042020`) are ignored.
pub fn estimate_year(header: &str) -> Option<i32> {
    let suffix = header.strip_prefix(ESTIMATE_PREFIX)?;
    (suffix.len() == 4 && suffix.bytes().all(|b| b.is_ascii_digit()))
        .then(|| suffix.parse().ok())
        .flatten()
}

/// Loads the county population file as an annual series keyed by FIPS.
#[derive(Debug, Clone, Copy, Default)]
pub struct CensusPopulationAdapter;

impl CensusPopulationAdapter {
    /// Create the adapter.
    pub const fn new() -> Self {
        Self
    }

    /// Parse the file. Each estimate is dated January 1 of its year.
    pub fn load(&self, df: &DataFrame) -> Result<(ObservationSeries, DropReport)> {
        require_columns(df, &["STATE", "COUNTY"])?;
        let states = string_values(df, "STATE")?;
        let counties = string_values(df, "COUNTY")?;

        let years: Vec<(i32, Vec<Option<f64>>)> = df
            .get_column_names()
            .into_iter()
            .filter_map(|name| estimate_year(name.as_str()).map(|y| (y, name.to_string())))
            .map(|(year, name)| float_values(df, &name).map(|values| (year, values)))
            .collect::<Result<_>>()?;
        if years.is_empty() {
            return Err(DataError::MissingColumn(format!("{ESTIMATE_PREFIX}<year>")));
        }

        let mut report = DropReport {
            rows: df.height(),
            ..Default::default()
        };
        let mut observations = Vec::with_capacity(df.height() * years.len());
        for i in 0..df.height() {
            let (Some(state), Some(county)) = (states[i].as_deref(), counties[i].as_deref()) else {
                report.drop_row("missing fips");
                continue;
            };
            if zero_pad(county, 3).as_deref() == Some("000") {
                report.drop_row("state total");
                continue;
            }
            let fips = match Fips::from_parts(state, county) {
                Ok(fips) => fips,
                Err(err) => {
                    report.drop_geo(&err);
                    continue;
                }
            };
            for (year, values) in &years {
                if let Some(date) = NaiveDate::from_ymd_opt(*year, 1, 1) {
                    observations.push(Observation::new(fips.clone().into(), date, values[i]));
                }
            }
            report.kept += 1;
        }

        let series = ObservationSeries::new(Measure::Population, Frequency::Annual, observations);
        report.log("census");
        info!(
            counties = report.kept,
            years = years.len(),
            "loaded census population estimates"
        );
        Ok((series, report))
    }
}
