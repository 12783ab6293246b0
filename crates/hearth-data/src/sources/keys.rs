//! Entity-key strategies and row-drop accounting for source adapters.

use crate::error::{DataError, Result};
use crate::reshape::LongTable;
use crate::series::{Frequency, Measure, Observation, ObservationSeries};
use hearth_geo::{CbsaCode, EntityKey, Fips, GeoError, GeoKeyResolver};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// How an extract identifies the geography of a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum KeyStrategy {
    /// A provider display name resolved through the static name table.
    MetroName {
        /// Column holding the name.
        column: String,
    },
    /// A CBSA (or metropolitan-division) code.
    Cbsa {
        /// Column holding the code.
        column: String,
    },
    /// A complete five-digit county FIPS code.
    CountyFips {
        /// Column holding the code.
        column: String,
    },
    /// Separate state and county FIPS parts, zero-padded and concatenated.
    CountyFipsParts {
        /// Column holding the state part.
        state_column: String,
        /// Column holding the county part.
        county_column: String,
    },
    /// No geography; the row is national.
    National,
}

impl KeyStrategy {
    /// Name-keyed strategy.
    pub fn metro_name(column: impl Into<String>) -> Self {
        Self::MetroName {
            column: column.into(),
        }
    }

    /// CBSA-keyed strategy.
    pub fn cbsa(column: impl Into<String>) -> Self {
        Self::Cbsa {
            column: column.into(),
        }
    }

    /// FIPS-keyed strategy.
    pub fn county_fips(column: impl Into<String>) -> Self {
        Self::CountyFips {
            column: column.into(),
        }
    }

    /// FIPS-parts strategy.
    pub fn county_fips_parts(state: impl Into<String>, county: impl Into<String>) -> Self {
        Self::CountyFipsParts {
            state_column: state.into(),
            county_column: county.into(),
        }
    }

    /// Columns the strategy reads, in the order [`KeyStrategy::resolve`] expects them.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            Self::MetroName { column } | Self::Cbsa { column } | Self::CountyFips { column } => {
                vec![column.as_str()]
            }
            Self::CountyFipsParts {
                state_column,
                county_column,
            } => vec![state_column.as_str(), county_column.as_str()],
            Self::National => Vec::new(),
        }
    }

    /// Resolve one row's key from the values of [`KeyStrategy::columns`].
    ///
    /// # Errors
    ///
    /// Returns a row-local [`GeoError`] when the key is blank, malformed or unmapped.
    pub fn resolve(
        &self,
        values: &[Option<&str>],
        resolver: &GeoKeyResolver,
    ) -> hearth_geo::Result<EntityKey> {
        let first = || {
            values.first().copied().flatten().ok_or(GeoError::Unmapped {
                kind: "blank key",
                key: String::new(),
            })
        };
        match self {
            Self::MetroName { .. } => Ok(resolver.resolve_name_to_cbsa(first()?)?.into()),
            Self::Cbsa { .. } => Ok(resolver.resolve_division(first()?)?.into()),
            Self::CountyFips { .. } => Ok(Fips::parse(first()?)?.into()),
            Self::CountyFipsParts { .. } => {
                let state = first()?;
                let county = values.get(1).copied().flatten().ok_or(GeoError::Unmapped {
                    kind: "blank key",
                    key: state.to_string(),
                })?;
                Ok(Fips::from_parts(state, county)?.into())
            }
            Self::National => Ok(EntityKey::National),
        }
    }
}

/// Rows dropped by an adapter, counted by reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropReport {
    /// Rows read from the extract.
    pub rows: usize,
    /// Rows kept.
    pub kept: usize,
    /// Dropped rows per reason.
    pub dropped: BTreeMap<String, usize>,
}

impl DropReport {
    /// Count a dropped row.
    pub fn drop_row(&mut self, reason: impl Into<String>) {
        *self.dropped.entry(reason.into()).or_default() += 1;
    }

    /// Count a row-local geography failure.
    pub fn drop_geo(&mut self, err: &GeoError) {
        self.drop_row(geo_reason(err));
    }

    /// Total dropped rows.
    pub fn total_dropped(&self) -> usize {
        self.dropped.values().sum()
    }

    /// Log the drop counts, if any.
    pub fn log(&self, source: &str) {
        if self.total_dropped() > 0 {
            warn!(
                source,
                rows = self.rows,
                kept = self.kept,
                dropped = ?self.dropped,
                "dropped rows from source"
            );
        }
    }
}

fn geo_reason(err: &GeoError) -> String {
    match err {
        GeoError::Unmapped { kind, .. } => format!("unmapped {kind}"),
        GeoError::InvalidFips(_) => "invalid fips".to_string(),
        GeoError::InvalidCbsa(_) => "invalid cbsa".to_string(),
        GeoError::CrosswalkMissing => "crosswalk missing".to_string(),
    }
}

/// Turn a melted table into an observation series keyed by `strategy`.
///
/// Rows whose key fails to resolve are dropped and counted; only a missing key
/// column is an error.
pub fn long_to_series(
    table: &LongTable,
    strategy: &KeyStrategy,
    resolver: &GeoKeyResolver,
    measure: Measure,
    frequency: Frequency,
) -> Result<(ObservationSeries, DropReport)> {
    let positions = strategy
        .columns()
        .into_iter()
        .map(|name| {
            table
                .id_position(name)
                .ok_or_else(|| DataError::MissingColumn(name.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut report = DropReport {
        rows: table.len(),
        ..Default::default()
    };
    let mut observations = Vec::with_capacity(table.len());
    // Key resolution is per entity, not per cell; cache by the raw id values.
    let mut cache: BTreeMap<Vec<Option<&str>>, std::result::Result<EntityKey, String>> =
        BTreeMap::new();

    for row in &table.rows {
        let raw: Vec<Option<&str>> = positions
            .iter()
            .map(|&p| row.ids.get(p).and_then(|v| v.as_deref()))
            .collect();
        let key = cache.entry(raw).or_insert_with_key(|raw| {
            strategy
                .resolve(raw, resolver)
                .map_err(|err| geo_reason(&err))
        });
        match key {
            Ok(entity) => {
                observations.push(Observation::new(entity.clone(), row.period, row.value));
                report.kept += 1;
            }
            Err(reason) => report.drop_row(reason.clone()),
        }
    }

    Ok((
        ObservationSeries::new(measure, frequency, observations),
        report,
    ))
}

/// CBSA code from a raw cell, following metropolitan-division aliases.
pub(crate) fn cbsa_key(raw: Option<&str>, resolver: &GeoKeyResolver) -> hearth_geo::Result<CbsaCode> {
    let raw = raw.ok_or(GeoError::Unmapped {
        kind: "blank key",
        key: String::new(),
    })?;
    resolver.resolve_division(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reshape::LongRow;
    use chrono::NaiveDate;
    use hearth_geo::CrosswalkRow;

    fn resolver() -> GeoKeyResolver {
        GeoKeyResolver::from_crosswalk([CrosswalkRow {
            state_fips: "6".to_string(),
            county_fips: "37".to_string(),
            cbsa_code: "31080".to_string(),
            ..Default::default()
        }])
        .unwrap()
    }

    fn row(ids: &[Option<&str>], value: f64) -> LongRow {
        LongRow {
            ids: ids.iter().map(|v| v.map(str::to_string)).collect(),
            period: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            value: Some(value),
        }
    }

    #[test]
    fn test_fips_parts_are_zero_padded() {
        let key = KeyStrategy::county_fips_parts("StateCodeFIPS", "MunicipalCodeFIPS")
            .resolve(&[Some("6"), Some("37")], &resolver())
            .unwrap();
        assert_eq!(key.code(), "06037");
    }

    #[test]
    fn test_division_alias() {
        let key = KeyStrategy::cbsa("place_id")
            .resolve(&[Some("31084")], &resolver())
            .unwrap();
        assert_eq!(key.code(), "31080");
    }

    #[test]
    fn test_unmapped_names_are_dropped_and_counted() {
        let table = LongTable {
            id_columns: vec!["RegionName".to_string()],
            value_name: "home_value".to_string(),
            rows: vec![
                row(&[Some("Los Angeles, CA")], 1.0),
                row(&[Some("Nowhere, ZZ")], 2.0),
                row(&[None], 3.0),
            ],
        };
        let (series, report) = long_to_series(
            &table,
            &KeyStrategy::metro_name("RegionName"),
            &resolver(),
            Measure::HomeValue,
            Frequency::Monthly,
        )
        .unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(report.kept, 1);
        assert_eq!(report.total_dropped(), 2);
        assert_eq!(report.dropped["unmapped metro name"], 1);
        assert_eq!(report.dropped["unmapped blank key"], 1);
    }

    #[test]
    fn test_missing_key_column_is_an_error() {
        let table = LongTable {
            id_columns: vec!["Other".to_string()],
            value_name: "rent".to_string(),
            rows: Vec::new(),
        };
        let result = long_to_series(
            &table,
            &KeyStrategy::metro_name("RegionName"),
            &resolver(),
            Measure::Rent,
            Frequency::Monthly,
        );
        assert!(matches!(result, Err(DataError::MissingColumn(_))));
    }
}
