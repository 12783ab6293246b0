//! Bureau of Labor Statistics extracts (CES employment, QCEW wages).
//!
//! BLS delivers long tables of `series_id, year, period, value`. The geography and
//! the data type are encoded in the series id at fixed character offsets.

use super::keys::{DropReport, cbsa_key};
use crate::calendar::quarter_month;
use crate::error::{DataError, Result};
use crate::frame::{float_values, has_column, string_values};
use crate::series::{Frequency, Measure, Observation, ObservationSeries};
use chrono::NaiveDate;
use hearth_geo::{CbsaCode, EntityKey, GeoKeyResolver};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// BLS survey a series id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlsProgram {
    /// Current Employment Statistics, state and metro area (`SMS`/`SMU`).
    Ces,
    /// Quarterly Census of Employment and Wages (`ENU`).
    Qcew,
}

/// A parsed BLS series id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlsSeriesId {
    /// Survey.
    pub program: BlsProgram,
    /// Metro area the series covers.
    pub area: String,
    /// Data type code (`01` for CES employment; `1`, `4`, `5` for QCEW).
    pub datatype: String,
    /// Whether the series is seasonally adjusted.
    pub seasonally_adjusted: bool,
}

impl BlsSeriesId {
    /// Parse a series id.
    ///
    /// CES: `SM` + `S|U` + state(2) + area(5) + industry(8) + datatype(2), e.g.
    /// `SMS06310800000000001`.
    /// QCEW: `EN` + `U|S` + `C` + the first four CBSA digits + datatype(1) + size(1)
    /// + ownership(1) + industry, e.g. `ENUC310840510`.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let invalid = || DataError::Parse(format!("unrecognized BLS series id: {raw}"));
        if !raw.is_ascii() {
            return Err(invalid());
        }
        if raw.starts_with("SM") && raw.len() >= 20 {
            return Ok(Self {
                program: BlsProgram::Ces,
                area: raw[5..10].to_string(),
                datatype: raw[18..20].to_string(),
                seasonally_adjusted: &raw[2..3] == "S",
            });
        }
        if raw.starts_with("EN") && raw.len() >= 11 && &raw[3..4] == "C" {
            return Ok(Self {
                program: BlsProgram::Qcew,
                area: format!("{}0", &raw[4..8]),
                datatype: raw[8..9].to_string(),
                seasonally_adjusted: &raw[2..3] == "S",
            });
        }
        Err(invalid())
    }

    /// Measure this series carries, if it is one the pipeline uses.
    pub fn measure(&self) -> Option<Measure> {
        match (self.program, self.datatype.as_str()) {
            (BlsProgram::Ces, "01") | (BlsProgram::Qcew, "1") => Some(Measure::Employment),
            (BlsProgram::Qcew, "4" | "5") => Some(Measure::Wage),
            _ => None,
        }
    }
}

/// A BLS period code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlsPeriod {
    /// `M01`..`M12`.
    Month(u32),
    /// `M13`, the annual average.
    AnnualAverage,
    /// `Q01`..`Q04` (or `Q1`..`Q4`).
    Quarter(u32),
}

impl BlsPeriod {
    /// Parse a period code.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (kind, number) = raw.split_at_checked(1)?;
        let number: u32 = number.parse().ok()?;
        match (kind, number) {
            ("M", 1..=12) => Some(Self::Month(number)),
            ("M", 13) => Some(Self::AnnualAverage),
            ("Q", 1..=4) => Some(Self::Quarter(number)),
            _ => None,
        }
    }

    /// First day of the period in `year`; `None` for the annual average.
    pub fn date(self, year: i32) -> Option<NaiveDate> {
        match self {
            Self::Month(m) => NaiveDate::from_ymd_opt(year, m, 1),
            Self::Quarter(q) => quarter_month(year, q),
            Self::AnnualAverage => None,
        }
    }

    /// Frequency of the period.
    pub const fn frequency(self) -> Frequency {
        match self {
            Self::Month(_) => Frequency::Monthly,
            Self::Quarter(_) => Frequency::Quarterly,
            Self::AnnualAverage => Frequency::Annual,
        }
    }
}

/// Series id column names seen in BLS downloads.
pub const SERIES_ID_COLUMNS: [&str; 2] = ["series_id", "seriesID"];
/// Pre-keyed metro column used when the extract has no series ids.
pub const METRO_CODE: &str = "metro_code";

/// Loads a BLS long table for one measure.
#[derive(Debug, Clone, Copy)]
pub struct BlsAdapter {
    measure: Measure,
}

impl BlsAdapter {
    /// Adapter for `measure` (employment or wage).
    pub const fn new(measure: Measure) -> Self {
        Self { measure }
    }

    /// Parse the table.
    ///
    /// Rows are keyed from the series id when a series id column is present,
    /// otherwise from `metro_code`. Series of other data types, annual averages and
    /// rows of a frequency different from the first kept row are dropped.
    pub fn load(
        &self,
        df: &DataFrame,
        resolver: &GeoKeyResolver,
    ) -> Result<(ObservationSeries, DropReport)> {
        let id_column = SERIES_ID_COLUMNS
            .into_iter()
            .find(|name| has_column(df, name));
        let keys = match id_column {
            Some(name) => string_values(df, name)?,
            None => string_values(df, METRO_CODE)?,
        };
        let years = float_values(df, "year")?;
        let periods = string_values(df, "period")?;
        let values = float_values(df, "value")?;

        let mut report = DropReport {
            rows: df.height(),
            ..Default::default()
        };
        let mut frequency: Option<Frequency> = None;
        let mut observations = Vec::with_capacity(df.height());

        for i in 0..df.height() {
            let cbsa = match (id_column, keys[i].as_deref()) {
                (Some(_), Some(raw)) => match BlsSeriesId::parse(raw) {
                    Ok(id) if id.measure() == Some(self.measure) => cbsa_key(Some(&id.area), resolver),
                    Ok(_) => {
                        report.drop_row("other datatype");
                        continue;
                    }
                    Err(_) => {
                        report.drop_row("invalid series id");
                        continue;
                    }
                },
                (_, raw) => cbsa_key(raw, resolver),
            };
            let cbsa: CbsaCode = match cbsa {
                Ok(cbsa) => cbsa,
                Err(err) => {
                    report.drop_geo(&err);
                    continue;
                }
            };

            let Some(period) = periods[i].as_deref().and_then(BlsPeriod::parse) else {
                report.drop_row("invalid period");
                continue;
            };
            let year = years[i].map(|y| y as i32);
            let Some(date) = year.and_then(|y| period.date(y)) else {
                report.drop_row("annual average");
                continue;
            };
            match frequency {
                None => frequency = Some(period.frequency()),
                Some(f) if f != period.frequency() => {
                    report.drop_row("mixed frequency");
                    continue;
                }
                Some(_) => {}
            }

            observations.push(Observation::new(EntityKey::Metro(cbsa), date, values[i]));
            report.kept += 1;
        }

        let series = ObservationSeries::new(
            self.measure,
            frequency.unwrap_or(Frequency::Monthly),
            observations,
        );
        report.log("bls");
        info!(
            measure = %self.measure,
            frequency = ?series.frequency,
            observations = series.len(),
            "loaded bls extract"
        );
        Ok((series, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_geo::CrosswalkRow;
    use rstest::rstest;

    fn resolver() -> GeoKeyResolver {
        GeoKeyResolver::from_crosswalk([CrosswalkRow {
            state_fips: "6".to_string(),
            county_fips: "37".to_string(),
            cbsa_code: "31080".to_string(),
            ..Default::default()
        }])
        .unwrap()
    }

    #[test]
    fn test_parse_ces_series_id() {
        let id = BlsSeriesId::parse("SMS06310800000000001").unwrap();
        assert_eq!(id.program, BlsProgram::Ces);
        assert_eq!(id.area, "31080");
        assert_eq!(id.datatype, "01");
        assert!(id.seasonally_adjusted);
        assert_eq!(id.measure(), Some(Measure::Employment));
    }

    #[test]
    fn test_parse_qcew_series_id() {
        let id = BlsSeriesId::parse("ENUC310840510").unwrap();
        assert_eq!(id.program, BlsProgram::Qcew);
        assert_eq!(id.area, "31080");
        assert_eq!(id.measure(), Some(Measure::Wage));
        assert!(BlsSeriesId::parse("LAUMT063108000000003").is_err());
    }

    #[rstest]
    #[case("M01", Some(BlsPeriod::Month(1)))]
    #[case("M12", Some(BlsPeriod::Month(12)))]
    #[case("M13", Some(BlsPeriod::AnnualAverage))]
    #[case("Q02", Some(BlsPeriod::Quarter(2)))]
    #[case("Q5", None)]
    #[case("", None)]
    fn test_parse_period(#[case] raw: &str, #[case] expected: Option<BlsPeriod>) {
        assert_eq!(BlsPeriod::parse(raw), expected);
    }

    #[test]
    fn test_quarter_period_date() {
        assert_eq!(
            BlsPeriod::Quarter(3).date(2023),
            NaiveDate::from_ymd_opt(2023, 7, 1)
        );
        assert_eq!(BlsPeriod::AnnualAverage.date(2023), None);
    }

    #[test]
    fn test_load_employment() {
        let df = df!(
            "series_id" => [
                "SMS06310800000000001",
                "SMS06310800000000001",
                "SMS06310800000000002",
                "SMS06310800000000001",
            ],
            "year" => [2024i64, 2024, 2024, 2023],
            "period" => ["M01", "M02", "M01", "M13"],
            "value" => [6_200.5, 6_210.0, 1.0, 6_150.0],
        )
        .unwrap();
        let (series, report) = BlsAdapter::new(Measure::Employment)
            .load(&df, &resolver())
            .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.frequency, Frequency::Monthly);
        assert_eq!(report.dropped["other datatype"], 1);
        assert_eq!(report.dropped["annual average"], 1);
    }

    #[test]
    fn test_load_metro_code_wages() {
        let df = df!(
            "metro_code" => ["31080", "31080"],
            "year" => [2024i64, 2024],
            "period" => ["Q01", "Q02"],
            "value" => [1_000.0, 1_030.0],
        )
        .unwrap();
        let (series, _) = BlsAdapter::new(Measure::Wage).load(&df, &resolver()).unwrap();
        assert_eq!(series.frequency, Frequency::Quarterly);
        assert_eq!(
            series.observations[1].date,
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
        );
    }
}
