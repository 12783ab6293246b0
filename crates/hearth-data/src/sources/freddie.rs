//! Freddie Mac Primary Mortgage Market Survey (weekly, national).

use super::keys::DropReport;
use crate::calendar::parse_period;
use crate::error::{DataError, Result};
use crate::frame::{float_values, string_values};
use crate::series::{Frequency, Measure, Observation, ObservationSeries};
use hearth_geo::EntityKey;
use polars::prelude::*;
use tracing::info;

/// Find the date and 30-year rate columns by name.
///
/// Column names vary between downloads (`date`, `Week`, `pmms30`, `30 yr FRM US`).
pub fn detect_columns(df: &DataFrame) -> Option<(String, String)> {
    let names: Vec<String> = df.get_column_names().iter().map(|c| c.to_string()).collect();
    let date = names.iter().find(|c| {
        let lower = c.to_lowercase();
        lower.contains("date") || lower.contains("week")
    })?;
    let rate = names.iter().find(|c| {
        let lower = c.to_lowercase();
        lower.contains("pmms30") || (lower.contains("30") && lower.contains("us"))
    })?;
    Some((date.clone(), rate.clone()))
}

/// Loads the weekly 30-year fixed rate as a national series.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreddieMacAdapter;

impl FreddieMacAdapter {
    /// Create the adapter.
    pub const fn new() -> Self {
        Self
    }

    /// Parse the file.
    pub fn load(&self, df: &DataFrame) -> Result<(ObservationSeries, DropReport)> {
        let (date_column, rate_column) = detect_columns(df)
            .ok_or_else(|| DataError::MissingColumn("date/pmms30".to_string()))?;
        let dates = string_values(df, &date_column)?;
        let rates = float_values(df, &rate_column)?;

        let mut report = DropReport {
            rows: df.height(),
            ..Default::default()
        };
        let mut observations = Vec::with_capacity(df.height());
        for (date, rate) in dates.iter().zip(rates) {
            match date.as_deref().and_then(parse_period) {
                Some(date) => {
                    observations.push(Observation::new(EntityKey::National, date, rate));
                    report.kept += 1;
                }
                None => report.drop_row("invalid date"),
            }
        }

        let series = ObservationSeries::new(Measure::MortgageRate, Frequency::Weekly, observations);
        report.log("freddie_mac");
        info!(weeks = series.len(), "loaded freddie mac mortgage rates");
        Ok((series, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_columns_and_loads() {
        let df = df!(
            "date" => ["2024-01-04", "2024-01-11", "bad"],
            "pmms30" => [6.62, 6.66, 6.0],
            "pmms15" => [5.89, 5.87, 5.0],
        )
        .unwrap();
        assert_eq!(
            detect_columns(&df),
            Some(("date".to_string(), "pmms30".to_string()))
        );
        let (series, report) = FreddieMacAdapter::new().load(&df).unwrap();
        assert!(series.is_national());
        assert_eq!(series.len(), 2);
        assert_eq!(report.dropped["invalid date"], 1);
    }

    #[test]
    fn test_missing_rate_column() {
        let df = df!("date" => ["2024-01-04"], "pmms15" => [5.89]).unwrap();
        assert!(matches!(
            FreddieMacAdapter::new().load(&df),
            Err(DataError::MissingColumn(_))
        ));
    }
}
