//! Joining normalized sources into the master table.

use crate::calendar::month_index;
use crate::error::{DataError, Result};
use crate::fill::{back_fill, forward_fill, interpolate_interior};
use crate::series::{Aggregation, Measure, ObservationSeries};
use chrono::{NaiveDate, Utc};
use hearth_geo::{CbsaCode, EntityKey, Fips, GeoKeyResolver, GeoLevel};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, info, warn};

/// Which gap-filling passes run after the joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillPolicy {
    /// Linear interpolation between known values.
    pub interpolate: bool,
    /// Carry the last known value forward.
    pub forward_fill: bool,
    /// Carry the first known value backward.
    pub back_fill: bool,
}

impl Default for FillPolicy {
    fn default() -> Self {
        Self {
            interpolate: true,
            forward_fill: true,
            back_fill: true,
        }
    }
}

impl FillPolicy {
    /// No filling; nulls stay null.
    pub const fn none() -> Self {
        Self {
            interpolate: false,
            forward_fill: false,
            back_fill: false,
        }
    }
}

/// Configuration for [`DatasetMerger`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Gap-filling passes.
    pub fill: FillPolicy,
    /// Processing date; later rows are dropped. Defaults to today.
    pub as_of: Option<NaiveDate>,
}

impl MergeConfig {
    /// The processing date in effect.
    pub fn resolved_as_of(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Provenance of one master-table cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    /// Published by the source for this entity and month.
    Observed,
    /// Interpolated between two observed values.
    Interpolated,
    /// Carried forward from an earlier month.
    ForwardFilled,
    /// Carried backward from a later month.
    BackFilled,
    /// No value.
    #[default]
    Missing,
}

impl Coverage {
    /// Lowercase label used in output tables.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Observed => "observed",
            Self::Interpolated => "interpolated",
            Self::ForwardFilled => "forward_filled",
            Self::BackFilled => "back_filled",
            Self::Missing => "missing",
        }
    }

    /// Whether the value was inferred rather than published.
    pub const fn is_estimated(&self) -> bool {
        matches!(
            self,
            Self::Interpolated | Self::ForwardFilled | Self::BackFilled
        )
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the master table: every measure for one entity in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRecord {
    /// Entity.
    pub entity: EntityKey,
    /// Month start.
    pub date: NaiveDate,
    /// Values indexed by [`Measure::index`].
    pub values: [Option<f64>; Measure::COUNT],
    /// Provenance indexed by [`Measure::index`].
    pub coverage: [Coverage; Measure::COUNT],
}

impl MasterRecord {
    /// Empty row for an entity and month.
    pub fn new(entity: EntityKey, date: NaiveDate) -> Self {
        Self {
            entity,
            date,
            values: [None; Measure::COUNT],
            coverage: [Coverage::Missing; Measure::COUNT],
        }
    }

    /// Set an observed value.
    pub fn with(mut self, measure: Measure, value: f64) -> Self {
        self.set_observed(measure, Some(value));
        self
    }

    /// Value of a measure.
    pub const fn get(&self, measure: Measure) -> Option<f64> {
        self.values[measure.index()]
    }

    /// Provenance of a measure.
    pub const fn coverage_of(&self, measure: Measure) -> Coverage {
        self.coverage[measure.index()]
    }

    /// Store a value as observed (or clear it).
    pub fn set_observed(&mut self, measure: Measure, value: Option<f64>) {
        let value = value.filter(|v| v.is_finite());
        self.values[measure.index()] = value;
        self.coverage[measure.index()] = if value.is_some() {
            Coverage::Observed
        } else {
            Coverage::Missing
        };
    }
}

/// The unified, sorted (entity, date) table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterTable {
    records: Vec<MasterRecord>,
}

impl MasterTable {
    /// Build from records, sorting by (entity, date).
    pub fn from_records(mut records: Vec<MasterRecord>) -> Self {
        records.sort_by(|a, b| (&a.entity, a.date).cmp(&(&b.entity, b.date)));
        Self { records }
    }

    /// All rows in (entity, date) order.
    pub fn records(&self) -> &[MasterRecord] {
        &self.records
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows grouped per entity, each group in date order.
    pub fn groups(&self) -> impl Iterator<Item = &[MasterRecord]> {
        self.records.chunk_by(|a, b| a.entity == b.entity)
    }

    /// Distinct entities in order.
    pub fn entities(&self) -> Vec<&EntityKey> {
        self.groups().map(|g| &g[0].entity).collect()
    }

    /// Rows of one entity.
    pub fn entity_rows(&self, entity: &EntityKey) -> &[MasterRecord] {
        let start = self.records.partition_point(|r| &r.entity < entity);
        let end = self.records.partition_point(|r| &r.entity <= entity);
        &self.records[start..end]
    }

    /// Latest date in the table.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.date).max()
    }

    /// Whether any row has a value for this measure.
    pub fn has_measure(&self, measure: Measure) -> bool {
        self.records.iter().any(|r| r.get(measure).is_some())
    }
}

/// How a source fared in the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    /// Joined onto the base.
    Joined,
    /// Skipped because it had no rows.
    Empty,
    /// Skipped because it duplicates the base measure.
    Duplicate,
}

/// Per-source merge counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    /// Measure carried by the source.
    pub measure: Measure,
    /// Outcome.
    pub status: SourceStatus,
    /// Observations in the source.
    pub observations: usize,
    /// Base rows that received a value.
    pub matched_rows: usize,
    /// Observations whose geography could not be resolved to the base level.
    pub unmapped: usize,
    /// Metro-months left empty because a summed roll-up was missing member counties.
    #[serde(default)]
    pub incomplete_rollups: usize,
}

/// Per-measure fill counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillCounts {
    /// Cells filled by interpolation.
    pub interpolated: usize,
    /// Cells filled forward.
    pub forward_filled: usize,
    /// Cells filled backward.
    pub back_filled: usize,
    /// Cells left null.
    pub missing: usize,
}

/// Counters from one merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Base rows after deduplication.
    pub base_rows: usize,
    /// Duplicate base observations removed.
    pub duplicates: usize,
    /// Rows dropped for being dated after the processing date.
    pub future_rows: usize,
    /// One entry per source, in input order.
    pub sources: Vec<SourceReport>,
    /// Fill counts per measure.
    pub fills: BTreeMap<Measure, FillCounts>,
}

/// Joins normalized sources onto the home-value base.
#[derive(Debug, Clone)]
pub struct DatasetMerger<'a> {
    resolver: &'a GeoKeyResolver,
    config: MergeConfig,
}

impl<'a> DatasetMerger<'a> {
    /// Merger with default configuration.
    pub fn new(resolver: &'a GeoKeyResolver) -> Self {
        Self::with_config(resolver, MergeConfig::default())
    }

    /// Merger with custom configuration.
    pub const fn with_config(resolver: &'a GeoKeyResolver, config: MergeConfig) -> Self {
        Self { resolver, config }
    }

    /// Current configuration.
    pub const fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Left-join `sources` onto `base` by (entity, date), then fill gaps per entity.
    ///
    /// National sources join on date alone. A county-level source joined onto a
    /// metro base is rolled up through the crosswalk; a metro-level source joined
    /// onto a county base is looked up through each county's primary CBSA. Rows
    /// dated after the processing date are dropped before filling.
    ///
    /// # Errors
    ///
    /// - [`DataError::MissingSource`] when `base` is `None`.
    /// - [`DataError::EmptyResult`] when the base has no rows left.
    /// - [`DataError::InvalidBase`] when the base is not a single-level home-value series.
    /// - [`DataError::NotMonthly`] when any series has non month-start dates.
    ///
    /// An empty optional source is skipped with a warning.
    pub fn merge(
        &self,
        base: Option<&ObservationSeries>,
        sources: &[&ObservationSeries],
    ) -> Result<(MasterTable, MergeReport)> {
        let base = base.ok_or(DataError::MissingSource(Measure::HomeValue))?;
        if base.measure != Measure::HomeValue {
            return Err(DataError::InvalidBase(format!(
                "expected home_value, got {}",
                base.measure
            )));
        }
        if base.is_empty() {
            return Err(DataError::EmptyResult {
                step: "home_value base".to_string(),
                required: true,
            });
        }
        if !base.is_month_aligned() {
            return Err(DataError::NotMonthly(base.measure));
        }
        let level = match base.level() {
            Some(level @ (GeoLevel::County | GeoLevel::Metro)) => level,
            Some(GeoLevel::National) => {
                return Err(DataError::InvalidBase("national home values".to_string()));
            }
            None => return Err(DataError::InvalidBase("mixed geographic levels".to_string())),
        };

        let mut report = MergeReport::default();
        let as_of = self.config.resolved_as_of();

        let mut base = base.clone();
        report.duplicates = base.dedup();
        let before = base.len();
        base.observations.retain(|o| o.date <= as_of);
        report.future_rows = before - base.len();
        if base.is_empty() {
            return Err(DataError::EmptyResult {
                step: "home_value base after dropping future rows".to_string(),
                required: true,
            });
        }
        report.base_rows = base.len();

        let mut records: Vec<MasterRecord> = base
            .observations
            .into_iter()
            .map(|o| {
                let mut record = MasterRecord::new(o.entity, o.date);
                record.set_observed(Measure::HomeValue, o.value);
                record
            })
            .collect();

        for source in sources {
            report.sources.push(self.join(&mut records, source, level)?);
        }

        let table = MasterTable::from_records(records);
        let table = self.fill(table, &mut report);

        info!(
            rows = table.len(),
            entities = table.entities().len(),
            future_rows = report.future_rows,
            sources = report.sources.len(),
            "merged master table"
        );
        Ok((table, report))
    }

    fn join(
        &self,
        records: &mut [MasterRecord],
        source: &ObservationSeries,
        level: GeoLevel,
    ) -> Result<SourceReport> {
        let mut source_report = SourceReport {
            measure: source.measure,
            status: SourceStatus::Joined,
            observations: source.len(),
            matched_rows: 0,
            unmapped: 0,
            incomplete_rollups: 0,
        };

        if source.is_empty() {
            let err = DataError::EmptyResult {
                step: source.measure.to_string(),
                required: false,
            };
            warn!(%err, "skipping optional source");
            source_report.status = SourceStatus::Empty;
            return Ok(source_report);
        }
        if source.measure == Measure::HomeValue {
            warn!("ignoring second home_value source");
            source_report.status = SourceStatus::Duplicate;
            return Ok(source_report);
        }
        if !source.is_month_aligned() {
            return Err(DataError::NotMonthly(source.measure));
        }

        let lookup = SourceLookup::build(source, level, self.resolver);
        source_report.unmapped = lookup.unmapped;
        source_report.incomplete_rollups = lookup.incomplete_rollups;
        for record in records.iter_mut() {
            if let Some(value) = lookup.get(&record.entity, record.date, self.resolver) {
                record.set_observed(source.measure, Some(value));
                source_report.matched_rows += 1;
            }
        }

        if source_report.incomplete_rollups > 0 {
            warn!(
                measure = %source.measure,
                incomplete = source_report.incomplete_rollups,
                "skipped metro totals with missing member counties"
            );
        }
        if source_report.unmapped > 0 {
            warn!(
                measure = %source.measure,
                unmapped = source_report.unmapped,
                "dropped observations with unresolved geography"
            );
        }
        debug!(
            measure = %source.measure,
            matched = source_report.matched_rows,
            "joined source"
        );
        Ok(source_report)
    }

    /// Per-entity, per-measure gap filling. Never crosses entity boundaries.
    fn fill(&self, table: MasterTable, report: &mut MergeReport) -> MasterTable {
        let policy = self.config.fill;
        let mut records = table.records;
        let mut start = 0;
        while start < records.len() {
            let end = start
                + records[start..]
                    .iter()
                    .take_while(|r| r.entity == records[start].entity)
                    .count();
            let group = &mut records[start..end];
            let positions: Vec<i32> = group.iter().map(|r| month_index(r.date)).collect();

            for measure in Measure::ALL {
                let i = measure.index();
                let mut values: Vec<Option<f64>> = group.iter().map(|r| r.values[i]).collect();
                if values.iter().all(Option::is_none) {
                    report.fills.entry(measure).or_default().missing += values.len();
                    continue;
                }
                let counts = report.fills.entry(measure).or_default();
                let mut mark = |indices: Vec<usize>, coverage: Coverage, n: &mut usize| {
                    *n += indices.len();
                    for j in indices {
                        group[j].coverage[i] = coverage;
                    }
                };
                if policy.interpolate {
                    let filled = interpolate_interior(&positions, &mut values);
                    mark(filled, Coverage::Interpolated, &mut counts.interpolated);
                }
                if policy.forward_fill {
                    let filled = forward_fill(&mut values);
                    mark(filled, Coverage::ForwardFilled, &mut counts.forward_filled);
                }
                if policy.back_fill {
                    let filled = back_fill(&mut values);
                    mark(filled, Coverage::BackFilled, &mut counts.back_filled);
                }
                counts.missing += values.iter().filter(|v| v.is_none()).count();
                for (record, value) in group.iter_mut().zip(values) {
                    record.values[i] = value;
                }
            }
            start = end;
        }
        MasterTable { records }
    }
}

/// A source indexed for lookups at the base's geographic level.
struct SourceLookup {
    direct: HashMap<(EntityKey, NaiveDate), f64>,
    metro: HashMap<(CbsaCode, NaiveDate), f64>,
    national: HashMap<NaiveDate, f64>,
    unmapped: usize,
    incomplete_rollups: usize,
}

impl SourceLookup {
    fn build(source: &ObservationSeries, level: GeoLevel, resolver: &GeoKeyResolver) -> Self {
        let mut lookup = Self {
            direct: HashMap::new(),
            metro: HashMap::new(),
            national: HashMap::new(),
            unmapped: 0,
            incomplete_rollups: 0,
        };
        let mut rollup: BTreeMap<(CbsaCode, NaiveDate), BTreeMap<Fips, f64>> = BTreeMap::new();

        for obs in &source.observations {
            let Some(value) = obs.value else { continue };
            match (&obs.entity, level) {
                (EntityKey::National, _) => {
                    lookup.national.entry(obs.date).or_insert(value);
                }
                (EntityKey::County(fips), GeoLevel::Metro) => {
                    match resolver.resolve_county_to_cbsa(fips) {
                        Some(cbsa) => {
                            rollup
                                .entry((cbsa.clone(), obs.date))
                                .or_default()
                                .entry(fips.clone())
                                .or_insert(value);
                        }
                        None => lookup.unmapped += 1,
                    }
                }
                (EntityKey::Metro(cbsa), GeoLevel::County) => {
                    lookup
                        .metro
                        .entry((cbsa.clone(), obs.date))
                        .or_insert(value);
                }
                (entity, _) => {
                    lookup
                        .direct
                        .entry((entity.clone(), obs.date))
                        .or_insert(value);
                }
            }
        }

        // A sum over part of a metro understates it; leave the month to the fill pass.
        let aggregation = source.measure.rollup();
        for ((cbsa, date), members) in rollup {
            if aggregation == Aggregation::Sum
                && members.len() < resolver.counties_in(&cbsa).len()
            {
                lookup.incomplete_rollups += 1;
                continue;
            }
            if let Some(value) = aggregation.apply(members.into_values().map(Some)) {
                lookup
                    .direct
                    .entry((EntityKey::Metro(cbsa), date))
                    .or_insert(value);
            }
        }
        lookup
    }

    fn get(&self, entity: &EntityKey, date: NaiveDate, resolver: &GeoKeyResolver) -> Option<f64> {
        if let Some(value) = self.direct.get(&(entity.clone(), date)) {
            return Some(*value);
        }
        if let EntityKey::County(fips) = entity {
            if let Some(value) = resolver
                .resolve_county_to_cbsa(fips)
                .and_then(|cbsa| self.metro.get(&(cbsa.clone(), date)))
            {
                return Some(*value);
            }
        }
        self.national.get(&date).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{Frequency, Observation};
    use approx::assert_relative_eq;
    use hearth_geo::CrosswalkRow;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn resolver() -> GeoKeyResolver {
        let row = |state: &str, county: &str, cbsa: &str| CrosswalkRow {
            state_fips: state.to_string(),
            county_fips: county.to_string(),
            cbsa_code: cbsa.to_string(),
            ..Default::default()
        };
        GeoKeyResolver::from_crosswalk([
            row("48", "453", "12420"),
            row("48", "491", "12420"),
            row("6", "37", "31080"),
        ])
        .unwrap()
    }

    fn metro(code: &str) -> EntityKey {
        EntityKey::Metro(CbsaCode::parse(code).unwrap())
    }

    fn county(code: &str) -> EntityKey {
        EntityKey::County(Fips::parse(code).unwrap())
    }

    fn series(measure: Measure, points: Vec<(EntityKey, NaiveDate, Option<f64>)>) -> ObservationSeries {
        ObservationSeries::new(
            measure,
            Frequency::Monthly,
            points
                .into_iter()
                .map(|(e, d, v)| Observation::new(e, d, v))
                .collect(),
        )
    }

    fn config() -> MergeConfig {
        MergeConfig {
            fill: FillPolicy::default(),
            as_of: Some(date(2024, 12)),
        }
    }

    fn home_values() -> ObservationSeries {
        series(
            Measure::HomeValue,
            vec![
                (metro("12420"), date(2024, 1), Some(450_000.0)),
                (metro("12420"), date(2024, 2), None),
                (metro("12420"), date(2024, 3), Some(460_000.0)),
                (metro("31080"), date(2024, 1), Some(900_000.0)),
                (metro("31080"), date(2024, 2), Some(905_000.0)),
                (metro("31080"), date(2025, 6), Some(1.0)),
            ],
        )
    }

    #[test]
    fn test_missing_base_is_fatal() {
        let resolver = resolver();
        let merger = DatasetMerger::with_config(&resolver, config());
        let err = merger.merge(None, &[]).unwrap_err();
        assert!(matches!(err, DataError::MissingSource(Measure::HomeValue)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_missing_rent_source_keeps_every_row() {
        let resolver = resolver();
        let merger = DatasetMerger::with_config(&resolver, config());
        let empty_rent = series(Measure::Rent, vec![]);
        let (table, report) = merger
            .merge(Some(&home_values()), &[&empty_rent])
            .unwrap();

        assert_eq!(table.len(), 5);
        assert_eq!(report.future_rows, 1);
        assert_eq!(report.sources[0].status, SourceStatus::Empty);
        assert!(table.records().iter().all(|r| r.get(Measure::Rent).is_none()));
        assert!(!table.has_measure(Measure::Rent));
    }

    #[test]
    fn test_interpolation_stays_within_entity() {
        let resolver = resolver();
        let merger = DatasetMerger::with_config(&resolver, config());
        let (table, _) = merger.merge(Some(&home_values()), &[]).unwrap();

        let austin = table.entity_rows(&metro("12420"));
        assert_eq!(austin.len(), 3);
        assert_relative_eq!(austin[1].get(Measure::HomeValue).unwrap(), 455_000.0);
        assert_eq!(austin[1].coverage_of(Measure::HomeValue), Coverage::Interpolated);
        assert_eq!(austin[0].coverage_of(Measure::HomeValue), Coverage::Observed);

        let la = table.entity_rows(&metro("31080"));
        assert_eq!(la.len(), 2);
        assert!(la.iter().all(|r| r.date <= date(2024, 12)));
    }

    #[test]
    fn test_national_broadcast_and_rollup() {
        let resolver = resolver();
        let merger = DatasetMerger::with_config(&resolver, config());
        let rates = series(
            Measure::MortgageRate,
            vec![(EntityKey::National, date(2024, 1), Some(6.6))],
        );
        let population = series(
            Measure::Population,
            vec![
                (county("48453"), date(2024, 1), Some(1_300_000.0)),
                (county("48491"), date(2024, 1), Some(700_000.0)),
                (county("99999"), date(2024, 1), Some(5.0)),
            ],
        );
        let (table, report) = merger
            .merge(Some(&home_values()), &[&rates, &population])
            .unwrap();

        let austin = table.entity_rows(&metro("12420"));
        assert_relative_eq!(austin[0].get(Measure::Population).unwrap(), 2_000_000.0);
        assert_eq!(austin[0].coverage_of(Measure::Population), Coverage::Observed);
        assert_eq!(austin[2].coverage_of(Measure::Population), Coverage::ForwardFilled);
        assert_eq!(report.sources[1].unmapped, 1);

        for record in table.records() {
            assert_relative_eq!(record.get(Measure::MortgageRate).unwrap(), 6.6);
        }
    }

    #[test]
    fn test_partial_rollup_is_not_summed() {
        let resolver = resolver();
        let merger = DatasetMerger::with_config(&resolver, config());
        let population = series(
            Measure::Population,
            vec![
                (county("48453"), date(2024, 1), Some(1_300_000.0)),
                (county("48491"), date(2024, 1), Some(700_000.0)),
                (county("48453"), date(2024, 2), Some(1_310_000.0)),
                (county("48453"), date(2024, 3), Some(1_320_000.0)),
                (county("48491"), date(2024, 3), Some(710_000.0)),
            ],
        );
        let (table, report) = merger
            .merge(Some(&home_values()), &[&population])
            .unwrap();

        let austin = table.entity_rows(&metro("12420"));
        assert_relative_eq!(austin[1].get(Measure::Population).unwrap(), 2_015_000.0);
        assert_eq!(austin[1].coverage_of(Measure::Population), Coverage::Interpolated);
        assert_relative_eq!(austin[2].get(Measure::Population).unwrap(), 2_030_000.0);
        assert_eq!(report.sources[0].incomplete_rollups, 1);
        assert_eq!(report.sources[0].matched_rows, 2);
    }

    #[test]
    fn test_metro_source_onto_county_base() {
        let resolver = resolver();
        let merger = DatasetMerger::with_config(&resolver, config());
        let base = series(
            Measure::HomeValue,
            vec![
                (county("48453"), date(2024, 1), Some(500_000.0)),
                (county("48491"), date(2024, 1), Some(400_000.0)),
            ],
        );
        let rent = series(
            Measure::Rent,
            vec![(metro("12420"), date(2024, 1), Some(1_800.0))],
        );
        let (table, _) = merger.merge(Some(&base), &[&rent]).unwrap();
        assert!(
            table
                .records()
                .iter()
                .all(|r| r.get(Measure::Rent) == Some(1_800.0))
        );
    }

    #[test]
    fn test_back_fill_marks_coverage() {
        let resolver = resolver();
        let merger = DatasetMerger::with_config(&resolver, config());
        let wage = series(
            Measure::Wage,
            vec![(metro("12420"), date(2024, 3), Some(1_500.0))],
        );
        let (table, report) = merger.merge(Some(&home_values()), &[&wage]).unwrap();
        let austin = table.entity_rows(&metro("12420"));
        assert_eq!(austin[0].coverage_of(Measure::Wage), Coverage::BackFilled);
        assert_eq!(report.fills[&Measure::Wage].back_filled, 2);
        // Los Angeles has no wage data at all.
        assert_eq!(report.fills[&Measure::Wage].missing, 2);
    }
}
