//! Zillow research extracts (ZHVI, ZORI, inventory).
//!
//! Zillow publishes one row per region with a column per month-end date.

use super::keys::{DropReport, KeyStrategy, long_to_series};
use crate::error::Result;
use crate::frame::has_column;
use crate::reshape::SeriesReshaper;
use crate::series::{Frequency, Measure, ObservationSeries};
use hearth_geo::GeoKeyResolver;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Region name column in metro-level files.
pub const REGION_NAME: &str = "RegionName";
/// Region type column (`msa`, `county`, `country`, ...).
pub const REGION_TYPE: &str = "RegionType";
/// State FIPS column in county-level files.
pub const STATE_FIPS: &str = "StateCodeFIPS";
/// County FIPS column in county-level files.
pub const COUNTY_FIPS: &str = "MunicipalCodeFIPS";

/// Geography of a Zillow file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZillowGeography {
    /// Metro rows keyed by display name ("Austin, TX").
    Metro,
    /// County rows keyed by FIPS parts.
    County,
}

impl ZillowGeography {
    const fn region_type(self) -> &'static str {
        match self {
            Self::Metro => "msa",
            Self::County => "county",
        }
    }

    fn strategy(self) -> KeyStrategy {
        match self {
            Self::Metro => KeyStrategy::metro_name(REGION_NAME),
            Self::County => KeyStrategy::county_fips_parts(STATE_FIPS, COUNTY_FIPS),
        }
    }
}

/// Loads one Zillow wide file as a monthly series.
#[derive(Debug, Clone, Copy)]
pub struct ZillowAdapter {
    measure: Measure,
    geography: ZillowGeography,
}

impl ZillowAdapter {
    /// Adapter for `measure` at `geography`.
    pub const fn new(measure: Measure, geography: ZillowGeography) -> Self {
        Self { measure, geography }
    }

    /// Melt the file and key every row.
    ///
    /// When a `RegionType` column is present, rows of other region types (the
    /// national "United States" row, for instance) are dropped.
    pub fn load(
        &self,
        df: &DataFrame,
        resolver: &GeoKeyResolver,
    ) -> Result<(ObservationSeries, DropReport)> {
        let mut table = SeriesReshaper::new()
            .dropping_nulls()
            .melt(df, self.measure.column())?;

        let mut other_type = 0;
        if has_column(df, REGION_TYPE) {
            if let Some(pos) = table.id_position(REGION_TYPE) {
                let wanted = self.geography.region_type();
                let before = table.rows.len();
                table.rows.retain(|row| {
                    row.ids[pos]
                        .as_deref()
                        .is_none_or(|t| t.eq_ignore_ascii_case(wanted))
                });
                other_type = before - table.rows.len();
            }
        }

        let (series, mut report) = long_to_series(
            &table,
            &self.geography.strategy(),
            resolver,
            self.measure,
            Frequency::Monthly,
        )?;
        if other_type > 0 {
            report.rows += other_type;
            *report.dropped.entry("other region type".to_string()).or_default() += other_type;
        }
        report.log(self.measure.column());
        info!(
            measure = %self.measure,
            observations = series.len(),
            entities = series.entities().len(),
            "loaded zillow extract"
        );
        Ok((series, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_geo::CrosswalkRow;

    fn resolver() -> GeoKeyResolver {
        GeoKeyResolver::from_crosswalk([CrosswalkRow {
            state_fips: "48".to_string(),
            county_fips: "453".to_string(),
            cbsa_code: "12420".to_string(),
            ..Default::default()
        }])
        .unwrap()
    }

    #[test]
    fn test_metro_file() {
        let df = df!(
            "RegionID" => [102001i64, 394355],
            "RegionName" => ["United States", "Austin, TX"],
            "RegionType" => ["country", "msa"],
            "2024-01-31" => [Some(350_000.0), Some(450_000.0)],
            "2024-02-29" => [Some(351_000.0), None],
        )
        .unwrap();
        let (series, report) = ZillowAdapter::new(Measure::HomeValue, ZillowGeography::Metro)
            .load(&df, &resolver())
            .unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.observations[0].entity.code(), "12420");
        assert_eq!(report.dropped["other region type"], 2);
    }

    #[test]
    fn test_county_file() {
        let df = df!(
            "RegionName" => ["Travis County"],
            "StateCodeFIPS" => [48i64],
            "MunicipalCodeFIPS" => [453i64],
            "2024-01-31" => [520_000.0],
        )
        .unwrap();
        let (series, report) = ZillowAdapter::new(Measure::HomeValue, ZillowGeography::County)
            .load(&df, &resolver())
            .unwrap();
        assert_eq!(series.observations[0].entity.code(), "48453");
        assert_eq!(report.total_dropped(), 0);
    }
}
