//! Evaluation of metrics over the master table.

use crate::error::{MetricError, Result};
use crate::metric::Metric;
use crate::registry::{available_metrics, create_metric};
use hearth_data::{MasterRecord, MasterTable};
use tracing::{debug, info};

/// The master table with one column per metric, row-aligned with the master rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable {
    master: MasterTable,
    names: Vec<&'static str>,
    values: Vec<Vec<Option<f64>>>,
}

impl MetricTable {
    /// Underlying master table.
    pub const fn master(&self) -> &MasterTable {
        &self.master
    }

    /// Metric column names, in evaluation order.
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Column index of a metric.
    pub fn metric_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| *n == name)
    }

    /// Metric values of one row, in [`MetricTable::names`] order.
    pub fn row_values(&self, row: usize) -> &[Option<f64>] {
        self.values.get(row).map_or(&[], Vec::as_slice)
    }

    /// One metric at one row.
    pub fn value(&self, row: usize, name: &str) -> Option<f64> {
        let col = self.metric_index(name)?;
        self.values.get(row)?.get(col).copied().flatten()
    }

    /// A whole metric column.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let col = self.metric_index(name)?;
        Some(self.values.iter().map(|row| row[col]).collect())
    }

    /// Rows grouped per entity, paired with their metric rows.
    pub fn groups(&self) -> impl Iterator<Item = (&[MasterRecord], &[Vec<Option<f64>>])> {
        let mut offset = 0;
        self.master.groups().map(move |rows| {
            let metrics = &self.values[offset..offset + rows.len()];
            offset += rows.len();
            (rows, metrics)
        })
    }
}

/// Computes derived metrics per entity.
#[derive(Debug)]
pub struct MetricEngine {
    metrics: Vec<Box<dyn Metric>>,
}

impl Default for MetricEngine {
    fn default() -> Self {
        Self {
            metrics: available_metrics()
                .into_iter()
                .filter_map(|info| create_metric(info.name))
                .collect(),
        }
    }
}

impl MetricEngine {
    /// Engine with every registered metric.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with the named metrics only.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::UnknownMetric`] for an unregistered name.
    pub fn with_metrics(names: &[&str]) -> Result<Self> {
        let metrics = names
            .iter()
            .map(|name| create_metric(name).ok_or_else(|| MetricError::UnknownMetric(name.to_string())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { metrics })
    }

    /// Add a custom metric.
    pub fn with_metric(mut self, metric: Box<dyn Metric>) -> Self {
        self.metrics.push(metric);
        self
    }

    /// Names of the metrics this engine evaluates.
    pub fn metric_names(&self) -> Vec<&'static str> {
        self.metrics.iter().map(|m| m.name()).collect()
    }

    /// Evaluate every metric on every row.
    ///
    /// Growth metrics look back by calendar month within the entity; a missing or
    /// null lookback row gives a null metric. The input is never modified, so
    /// recomputing on the same table yields identical values.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::EmptyMaster`] for an empty table.
    pub fn compute_metrics(&self, master: &MasterTable) -> Result<MetricTable> {
        if master.is_empty() {
            return Err(MetricError::EmptyMaster);
        }

        let mut values = Vec::with_capacity(master.len());
        for rows in master.groups() {
            for t in 0..rows.len() {
                values.push(self.metrics.iter().map(|m| m.compute(rows, t)).collect());
            }
            debug!(entity = %rows[0].entity, rows = rows.len(), "computed metrics");
        }

        let names = self.metric_names();
        info!(
            rows = values.len(),
            metrics = names.len(),
            "computed derived metrics"
        );
        Ok(MetricTable {
            master: master.clone(),
            names,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hearth_data::calendar::add_months;
    use hearth_data::{MasterRecord, Measure};
    use hearth_geo::{CbsaCode, EntityKey};

    fn master() -> MasterTable {
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let mut records = Vec::new();
        for (code, base) in [("12420", 300_000.0), ("31080", 800_000.0)] {
            let entity = EntityKey::Metro(CbsaCode::parse(code).unwrap());
            for m in 0..40 {
                let date = add_months(start, m).unwrap();
                let price = base * (1.0 + 0.005 * f64::from(m));
                records.push(MasterRecord::new(entity.clone(), date).with(Measure::HomeValue, price));
            }
        }
        MasterTable::from_records(records)
    }

    #[test]
    fn test_missing_rent_leaves_yield_null() {
        let table = MetricEngine::new().compute_metrics(&master()).unwrap();
        assert_eq!(table.len(), 80);
        let yields = table.column("rental_yield").unwrap();
        assert!(yields.iter().all(Option::is_none));
    }

    #[test]
    fn test_growth_never_crosses_entities() {
        let table = MetricEngine::with_metrics(&["price_yoy"]).unwrap().compute_metrics(&master()).unwrap();
        // First row of the second entity has no lookback of its own.
        assert_eq!(table.value(40, "price_yoy"), None);
        assert!(table.value(52, "price_yoy").is_some());
        assert_eq!(table.value(11, "price_yoy"), None);
        assert!(table.value(12, "price_yoy").is_some());
    }

    #[test]
    fn test_recompute_is_bit_identical() {
        let engine = MetricEngine::new();
        let first = engine.compute_metrics(&master()).unwrap();
        let second = engine.compute_metrics(first.master()).unwrap();
        assert_eq!(first, second);
        let a = first.column("price_yoy").unwrap();
        let b = second.column("price_yoy").unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.map(f64::to_bits), y.map(f64::to_bits));
        }
    }

    #[test]
    fn test_empty_and_unknown() {
        assert_eq!(
            MetricEngine::new().compute_metrics(&MasterTable::default()).unwrap_err(),
            MetricError::EmptyMaster
        );
        assert!(matches!(
            MetricEngine::with_metrics(&["nope"]),
            Err(MetricError::UnknownMetric(_))
        ));
    }

    #[test]
    fn test_groups_align() {
        let table = MetricEngine::new().compute_metrics(&master()).unwrap();
        let groups: Vec<_> = table.groups().collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].0.len(), groups[1].1.len());
    }
}
