//! FHFA house price index extracts.
//!
//! The master HPI file stacks several index types, flavors and frequencies. Only
//! the traditional purchase-only index is used. Large metros are published by
//! metropolitan division and are mapped back to their CBSA.

use super::keys::{DropReport, cbsa_key};
use crate::calendar::quarter_month;
use crate::error::Result;
use crate::frame::{float_values, has_column, string_values};
use crate::series::{Frequency, Measure, Observation, ObservationSeries};
use chrono::NaiveDate;
use hearth_geo::{EntityKey, GeoKeyResolver};
use polars::prelude::*;
use tracing::info;

/// Index type kept from the master file.
pub const HPI_TYPE: &str = "traditional";
/// Index flavor kept from the master file.
pub const HPI_FLAVOR: &str = "purchase-only";

/// Loads the FHFA metro HPI.
#[derive(Debug, Clone, Copy)]
pub struct FhfaAdapter {
    frequency: Frequency,
}

impl Default for FhfaAdapter {
    fn default() -> Self {
        Self::new(Frequency::Quarterly)
    }
}

impl FhfaAdapter {
    /// Adapter keeping rows of `frequency` (monthly or quarterly).
    pub const fn new(frequency: Frequency) -> Self {
        Self { frequency }
    }

    const fn frequency_label(&self) -> &'static str {
        match self.frequency {
            Frequency::Monthly => "monthly",
            _ => "quarterly",
        }
    }

    /// Parse the file.
    ///
    /// The seasonally adjusted index is used when present for a row, falling back
    /// to the unadjusted index.
    pub fn load(
        &self,
        df: &DataFrame,
        resolver: &GeoKeyResolver,
    ) -> Result<(ObservationSeries, DropReport)> {
        let optional = |name: &str| -> Result<Option<Vec<Option<String>>>> {
            if has_column(df, name) {
                string_values(df, name).map(Some)
            } else {
                Ok(None)
            }
        };
        let hpi_type = optional("hpi_type")?;
        let hpi_flavor = optional("hpi_flavor")?;
        let frequency = optional("frequency")?;
        let places = string_values(df, "place_id")?;
        let years = float_values(df, "yr")?;
        let periods = float_values(df, "period")?;
        let sa = if has_column(df, "index_sa") {
            Some(float_values(df, "index_sa")?)
        } else {
            None
        };
        let nsa = float_values(df, "index_nsa")?;

        let mut report = DropReport {
            rows: df.height(),
            ..Default::default()
        };
        let keep = |column: &Option<Vec<Option<String>>>, i: usize, wanted: &str| {
            column
                .as_ref()
                .is_none_or(|values| values[i].as_deref() == Some(wanted))
        };

        let mut observations = Vec::new();
        for i in 0..df.height() {
            if !keep(&hpi_type, i, HPI_TYPE) || !keep(&hpi_flavor, i, HPI_FLAVOR) {
                report.drop_row("other index");
                continue;
            }
            if !keep(&frequency, i, self.frequency_label()) {
                report.drop_row("other frequency");
                continue;
            }
            let cbsa = match cbsa_key(places[i].as_deref(), resolver) {
                Ok(cbsa) => cbsa,
                Err(err) => {
                    report.drop_geo(&err);
                    continue;
                }
            };
            let Some(date) = self.date(years[i], periods[i]) else {
                report.drop_row("invalid period");
                continue;
            };
            let value = sa.as_ref().and_then(|sa| sa[i]).or(nsa[i]);
            observations.push(Observation::new(EntityKey::Metro(cbsa), date, value));
            report.kept += 1;
        }

        let mut series = ObservationSeries::new(Measure::Hpi, self.frequency, observations);
        let duplicates = series.dedup();
        report.log("fhfa");
        info!(
            observations = series.len(),
            duplicates,
            "loaded fhfa house price index"
        );
        Ok((series, report))
    }

    fn date(&self, year: Option<f64>, period: Option<f64>) -> Option<NaiveDate> {
        let year = year? as i32;
        let period = period? as u32;
        match self.frequency {
            Frequency::Monthly => NaiveDate::from_ymd_opt(year, period, 1),
            _ => quarter_month(year, period),
        }
    }
}
