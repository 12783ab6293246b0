//! Collapsing each entity's history to one scoring row.

use crate::engine::MetricTable;
use crate::error::MetricError;
use crate::growth::GrowthConfig;
use crate::metric::lookback_value;
use chrono::NaiveDate;
use hearth_data::calendar::months_between;
use hearth_data::{Coverage, MasterRecord, Measure};
use hearth_geo::EntityKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Snapshot metric name for price growth over the short horizon.
pub const PRICE_MOM: &str = "price_mom";
/// Snapshot metric name for price growth over the medium horizon.
pub const PRICE_YOY: &str = "price_yoy";
/// Snapshot metric name for compound price growth over the long horizon.
pub const PRICE_3Y_CAGR: &str = "price_3y_cagr";
/// Snapshot metric name for population growth.
pub const POPULATION_GROWTH: &str = "population_growth";

/// Lookback horizons, in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lookbacks {
    /// Month-over-month horizon.
    pub short: u32,
    /// Year-over-year horizon.
    pub medium: u32,
    /// Compound-growth horizon.
    pub long: u32,
}

impl Default for Lookbacks {
    fn default() -> Self {
        Self {
            short: 1,
            medium: 12,
            long: 36,
        }
    }
}

/// Configuration for [`SnapshotBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Price growth horizons.
    pub lookbacks: Lookbacks,
    /// History an entity needs to count as fully covered.
    pub min_history_months: u32,
    /// Skip entities whose last observed home value predates this date.
    pub stale_before: Option<NaiveDate>,
    /// Horizon for population growth.
    pub population_horizon_months: u32,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            lookbacks: Lookbacks::default(),
            min_history_months: 36,
            stale_before: None,
            population_horizon_months: 12,
        }
    }
}

/// One entity's latest state plus growth figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Entity.
    pub entity: EntityKey,
    /// Month of the latest row with a home value.
    pub date: NaiveDate,
    /// Month of the latest directly observed home value.
    pub last_observed: NaiveDate,
    /// Months between the first and latest home value.
    pub history_months: u32,
    /// Whether `history_months` meets the configured minimum.
    pub full_history: bool,
    /// Measure values at `date`, indexed by [`Measure::index`].
    pub values: [Option<f64>; Measure::COUNT],
    /// Provenance of `values`.
    pub coverage: [Coverage; Measure::COUNT],
    /// Non-null metrics at `date`, by name.
    pub metrics: BTreeMap<String, f64>,
    /// Metrics left null for lack of history.
    pub issues: Vec<MetricError>,
}

impl MetricSnapshot {
    /// Measure value.
    pub const fn value(&self, measure: Measure) -> Option<f64> {
        self.values[measure.index()]
    }

    /// Measure provenance.
    pub const fn coverage_of(&self, measure: Measure) -> Coverage {
        self.coverage[measure.index()]
    }

    /// Metric value by name.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    /// Latest home value.
    pub const fn price(&self) -> Option<f64> {
        self.value(Measure::HomeValue)
    }
}

/// Entity counts from collapsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotReport {
    /// Entities in the master table.
    pub entities: usize,
    /// Entities with a snapshot.
    pub kept: usize,
    /// Entities without any home value.
    pub skipped_no_price: usize,
    /// Entities whose last observation predates the staleness cutoff.
    pub skipped_stale: usize,
    /// Entities below the minimum history (kept, with null long-horizon metrics).
    pub short_history: usize,
}

/// Snapshots plus the counters that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSet {
    /// One snapshot per kept entity, in entity order.
    pub snapshots: Vec<MetricSnapshot>,
    /// Counters.
    pub report: SnapshotReport,
}

/// Collapses a [`MetricTable`] to one [`MetricSnapshot`] per entity.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    config: SnapshotConfig,
}

impl SnapshotBuilder {
    /// Builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with custom configuration.
    pub const fn with_config(config: SnapshotConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    pub const fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Collapse every entity.
    ///
    /// An entity is dropped only when it has no home value at all or is stale.
    /// Too little history nulls the affected growth metrics and is recorded as a
    /// [`MetricError::InsufficientHistory`] on the snapshot.
    pub fn build(&self, table: &MetricTable) -> SnapshotSet {
        let mut report = SnapshotReport::default();
        let mut snapshots = Vec::new();

        for (rows, metric_rows) in table.groups() {
            report.entities += 1;
            match self.collapse(rows, metric_rows, table.names()) {
                Collapse::Kept(snapshot) => {
                    if !snapshot.full_history {
                        report.short_history += 1;
                    }
                    snapshots.push(*snapshot);
                }
                Collapse::NoPrice => report.skipped_no_price += 1,
                Collapse::Stale => report.skipped_stale += 1,
            }
        }
        report.kept = snapshots.len();

        if report.skipped_stale + report.skipped_no_price > 0 {
            warn!(
                no_price = report.skipped_no_price,
                stale = report.skipped_stale,
                "skipped entities while building snapshots"
            );
        }
        info!(
            entities = report.entities,
            kept = report.kept,
            short_history = report.short_history,
            "built metric snapshots"
        );
        SnapshotSet { snapshots, report }
    }

    fn collapse(
        &self,
        rows: &[MasterRecord],
        metric_rows: &[Vec<Option<f64>>],
        names: &[&'static str],
    ) -> Collapse {
        let has_price = |r: &&MasterRecord| r.get(Measure::HomeValue).is_some();
        let Some(t) = rows.iter().rposition(|r| has_price(&r)) else {
            return Collapse::NoPrice;
        };
        let latest = &rows[t];
        let last_observed = rows
            .iter()
            .rev()
            .find(|r| r.coverage_of(Measure::HomeValue) == Coverage::Observed)
            .map_or(latest.date, |r| r.date);
        if self
            .config
            .stale_before
            .is_some_and(|cutoff| last_observed < cutoff)
        {
            return Collapse::Stale;
        }

        let first = rows.iter().find(has_price).map_or(latest.date, |r| r.date);
        let history_months = u32::try_from(months_between(first, latest.date)).unwrap_or(0);

        let mut metrics: BTreeMap<String, f64> = names
            .iter()
            .zip(metric_rows.get(t).map_or(&[][..], Vec::as_slice))
            .filter_map(|(name, value)| value.map(|v| ((*name).to_string(), v)))
            .collect();

        let mut issues = Vec::new();
        let lookbacks = self.config.lookbacks;
        let population_end = latest_revision(rows, t, Measure::Population).unwrap_or(t);
        let horizons = [
            (PRICE_MOM, GrowthConfig::cumulative(Measure::HomeValue, lookbacks.short), t),
            (PRICE_YOY, GrowthConfig::cumulative(Measure::HomeValue, lookbacks.medium), t),
            (PRICE_3Y_CAGR, GrowthConfig::annualized(Measure::HomeValue, lookbacks.long), t),
            (
                POPULATION_GROWTH,
                GrowthConfig::cumulative(Measure::Population, self.config.population_horizon_months),
                population_end,
            ),
        ];
        for (name, config, end) in horizons {
            metrics.remove(name);
            let growth_at = |i: usize| {
                rows[i].get(config.measure).and_then(|current| {
                    lookback_value(rows, i, config.measure, config.lookback_months)
                        .and_then(|previous| config.growth(current, previous))
                })
            };
            let growth = growth_at(end).or_else(|| (end != t).then(|| growth_at(t)).flatten());
            match growth {
                Some(value) => {
                    metrics.insert(name.to_string(), value);
                }
                None if config.measure == Measure::HomeValue
                    && history_months < config.lookback_months =>
                {
                    issues.push(MetricError::InsufficientHistory {
                        entity: latest.entity.to_string(),
                        metric: name.to_string(),
                        required_months: config.lookback_months,
                        available_months: history_months,
                    });
                }
                None => {}
            }
        }

        Collapse::Kept(Box::new(MetricSnapshot {
            entity: latest.entity.clone(),
            date: latest.date,
            last_observed,
            history_months,
            full_history: history_months >= self.config.min_history_months,
            values: latest.values,
            coverage: latest.coverage,
            metrics,
            issues,
        }))
    }
}

/// Row at or before `t` where the last directly observed value of `measure`
/// first appeared.
///
/// Annual estimates lag the price data and are carried forward to the latest
/// month, so the flat tail after the newest estimate carries no growth. Growth is
/// measured ending at the start of that tail instead.
fn latest_revision(rows: &[MasterRecord], t: usize, measure: Measure) -> Option<usize> {
    let latest = (0..=t).rev().find(|&i| {
        rows[i].get(measure).is_some() && rows[i].coverage_of(measure) == Coverage::Observed
    })?;
    let value = rows[latest].get(measure);
    let mut start = latest;
    while start > 0 && rows[start - 1].get(measure) == value {
        start -= 1;
    }
    Some(start)
}

enum Collapse {
    Kept(Box<MetricSnapshot>),
    NoPrice,
    Stale,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MetricEngine;
    use approx::assert_relative_eq;
    use hearth_data::MasterTable;
    use hearth_data::calendar::add_months;
    use hearth_geo::CbsaCode;

    fn metro(code: &str) -> EntityKey {
        EntityKey::Metro(CbsaCode::parse(code).unwrap())
    }

    fn history(code: &str, months: i32, start_price: f64) -> Vec<MasterRecord> {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        (0..months)
            .map(|m| {
                MasterRecord::new(metro(code), add_months(start, m).unwrap())
                    .with(Measure::HomeValue, start_price + 1_000.0 * f64::from(m))
                    .with(Measure::Population, 1_000.0 + f64::from(m))
            })
            .collect()
    }

    fn table(records: Vec<MasterRecord>) -> MetricTable {
        MetricEngine::new()
            .compute_metrics(&MasterTable::from_records(records))
            .unwrap()
    }

    #[test]
    fn test_full_history_snapshot() {
        let set = SnapshotBuilder::new().build(&table(history("12420", 37, 200_000.0)));
        assert_eq!(set.report.kept, 1);
        let snapshot = &set.snapshots[0];
        assert_eq!(snapshot.history_months, 36);
        assert!(snapshot.full_history);
        assert!(snapshot.issues.is_empty());
        assert_relative_eq!(
            snapshot.metric(PRICE_3Y_CAGR).unwrap(),
            (236_000.0f64 / 200_000.0).powf(1.0 / 3.0) - 1.0
        );
        assert_relative_eq!(
            snapshot.metric(PRICE_YOY).unwrap(),
            (236_000.0 - 224_000.0) / 224_000.0
        );
        assert_relative_eq!(
            snapshot.metric(POPULATION_GROWTH).unwrap(),
            (1_036.0 - 1_024.0) / 1_024.0
        );
    }

    fn with_population(mut records: Vec<MasterRecord>, population: impl Fn(i32) -> f64) -> Vec<MasterRecord> {
        for (m, record) in (0..).zip(records.iter_mut()) {
            record.set_observed(Measure::Population, Some(population(m)));
        }
        records
    }

    #[test]
    fn test_lagging_population_uses_latest_estimate() {
        // Estimates rise 3% over the first year, then the last one is carried
        // forward for two years.
        let records = with_population(history("12420", 37, 200_000.0), |m| {
            1_000.0 + 30.0 * f64::from(m.min(12)) / 12.0
        });
        let set = SnapshotBuilder::new().build(&table(records));
        assert_relative_eq!(
            set.snapshots[0].metric(POPULATION_GROWTH).unwrap(),
            0.03,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_flat_population_has_zero_growth() {
        let records = with_population(history("12420", 37, 200_000.0), |_| 5_000.0);
        let set = SnapshotBuilder::new().build(&table(records));
        assert_eq!(set.snapshots[0].metric(POPULATION_GROWTH), Some(0.0));
    }

    #[test]
    fn test_snapshot_json_keeps_issues() {
        let set = SnapshotBuilder::new().build(&table(history("12420", 20, 200_000.0)));
        let json = serde_json::to_string(&set.snapshots[0]).unwrap();
        let parsed: MetricSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.issues, set.snapshots[0].issues);
        assert!(json.contains("insufficient_history"));
    }

    #[test]
    fn test_short_history_keeps_entity() {
        let set = SnapshotBuilder::new().build(&table(history("12420", 20, 200_000.0)));
        assert_eq!(set.report.kept, 1);
        assert_eq!(set.report.short_history, 1);
        let snapshot = &set.snapshots[0];
        assert!(snapshot.metric(PRICE_3Y_CAGR).is_none());
        assert!(snapshot.metric(PRICE_YOY).is_some());
        assert!(matches!(
            &snapshot.issues[0],
            MetricError::InsufficientHistory { metric, required_months: 36, available_months: 19, .. }
                if metric == PRICE_3Y_CAGR
        ));
    }

    #[test]
    fn test_stale_entities_are_skipped() {
        let mut records = history("12420", 24, 200_000.0);
        records.extend(history("31080", 12, 800_000.0));
        let config = SnapshotConfig {
            stale_before: NaiveDate::from_ymd_opt(2022, 1, 1),
            ..Default::default()
        };
        let set = SnapshotBuilder::with_config(config).build(&table(records));
        assert_eq!(set.report.entities, 2);
        assert_eq!(set.report.skipped_stale, 1);
        assert_eq!(set.snapshots[0].entity, metro("12420"));
    }

    #[test]
    fn test_latest_valid_row_is_used() {
        let mut records = history("12420", 14, 200_000.0);
        records.push(MasterRecord::new(
            metro("12420"),
            NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
        ));
        let set = SnapshotBuilder::new().build(&table(records));
        assert_eq!(
            set.snapshots[0].date,
            NaiveDate::from_ymd_opt(2022, 2, 1).unwrap()
        );
    }
}
