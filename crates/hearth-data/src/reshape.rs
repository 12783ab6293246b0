//! Wide-to-long reshaping.
//!
//! Providers such as Zillow publish one row per region and one column per period.
//! [`SeriesReshaper::melt`] turns that into one row per (identifiers, period, value);
//! [`SeriesReshaper::pivot`] is the inverse.

use crate::calendar::{is_period_header, parse_period};
use crate::error::Result;
use crate::frame::{float_values, string_values};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Date format used for period headers written by [`SeriesReshaper::pivot`].
pub const PERIOD_HEADER_FORMAT: &str = "%Y-%m-%d";

/// One melted cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongRow {
    /// Identifier values, in the order of [`LongTable::id_columns`].
    pub ids: Vec<Option<String>>,
    /// Period parsed from the column header.
    pub period: NaiveDate,
    /// Cell value.
    pub value: Option<f64>,
}

/// Result of melting a wide table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongTable {
    /// Names of the identifier columns carried on every row.
    pub id_columns: Vec<String>,
    /// Name of the value column.
    pub value_name: String,
    /// Rows in source row order, then period order.
    pub rows: Vec<LongRow>,
}

impl LongTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of an identifier column.
    pub fn id_position(&self, name: &str) -> Option<usize> {
        self.id_columns.iter().position(|c| c == name)
    }
}

/// Stateless wide-to-long transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesReshaper {
    drop_nulls: bool,
}

impl SeriesReshaper {
    /// Reshaper that keeps null cells.
    pub const fn new() -> Self {
        Self { drop_nulls: false }
    }

    /// Skip null cells while melting.
    pub const fn dropping_nulls(mut self) -> Self {
        self.drop_nulls = true;
        self
    }

    /// Split the headers of a wide table into identifier and period columns.
    pub fn split_columns(df: &DataFrame) -> (Vec<String>, Vec<(String, NaiveDate)>) {
        let mut ids = Vec::new();
        let mut periods = Vec::new();
        for name in df.get_column_names() {
            let name = name.as_str();
            match is_period_header(name).then(|| parse_period(name)).flatten() {
                Some(period) => periods.push((name.to_string(), period)),
                None => ids.push(name.to_string()),
            }
        }
        (ids, periods)
    }

    /// Melt a wide table into long form.
    ///
    /// A table with no recognizable period columns yields an empty [`LongTable`]
    /// (with a warning) rather than an error, so one malformed source does not
    /// abort the run.
    pub fn melt(&self, df: &DataFrame, value_name: &str) -> Result<LongTable> {
        let (id_columns, periods) = Self::split_columns(df);
        let mut table = LongTable {
            id_columns,
            value_name: value_name.to_string(),
            rows: Vec::new(),
        };

        if periods.is_empty() {
            warn!(value = value_name, "no period columns found; returning empty series");
            return Ok(table);
        }

        let ids = table
            .id_columns
            .iter()
            .map(|name| string_values(df, name))
            .collect::<Result<Vec<_>>>()?;
        let values = periods
            .iter()
            .map(|(name, _)| float_values(df, name))
            .collect::<Result<Vec<_>>>()?;

        table.rows.reserve(df.height() * periods.len());
        for row in 0..df.height() {
            let row_ids: Vec<Option<String>> = ids.iter().map(|col| col[row].clone()).collect();
            for ((_, period), column) in periods.iter().zip(&values) {
                let value = column[row];
                if self.drop_nulls && value.is_none() {
                    continue;
                }
                table.rows.push(LongRow {
                    ids: row_ids.clone(),
                    period: *period,
                    value,
                });
            }
        }

        debug!(
            value = value_name,
            periods = periods.len(),
            rows = table.rows.len(),
            "melted wide table"
        );
        Ok(table)
    }

    /// Pivot a long table back to wide form.
    ///
    /// Identifier tuples keep their first-seen order and period columns are sorted
    /// ascending, with headers formatted as [`PERIOD_HEADER_FORMAT`].
    pub fn pivot(&self, table: &LongTable) -> Result<DataFrame> {
        let mut keys: Vec<&[Option<String>]> = Vec::new();
        let mut key_index: HashMap<&[Option<String>], usize> = HashMap::new();
        for row in &table.rows {
            key_index.entry(row.ids.as_slice()).or_insert_with(|| {
                keys.push(row.ids.as_slice());
                keys.len() - 1
            });
        }

        let periods: Vec<NaiveDate> = table
            .rows
            .iter()
            .map(|r| r.period)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let period_index: HashMap<NaiveDate, usize> =
            periods.iter().enumerate().map(|(i, p)| (*p, i)).collect();

        let mut cells = vec![vec![None; keys.len()]; periods.len()];
        for row in &table.rows {
            let r = key_index[row.ids.as_slice()];
            let p = period_index[&row.period];
            if cells[p][r].is_none() {
                cells[p][r] = row.value;
            }
        }

        let mut columns: Vec<Column> = Vec::with_capacity(table.id_columns.len() + periods.len());
        for (i, name) in table.id_columns.iter().enumerate() {
            let values: Vec<Option<String>> = keys
                .iter()
                .map(|k| k.get(i).cloned().flatten())
                .collect();
            columns.push(Series::new(name.as_str().into(), values).into());
        }
        for (period, values) in periods.iter().zip(cells) {
            let header = period.format(PERIOD_HEADER_FORMAT).to_string();
            columns.push(Series::new(header.into(), values).into());
        }

        Ok(DataFrame::new(columns)?)
    }
}
