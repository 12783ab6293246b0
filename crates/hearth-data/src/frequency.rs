//! Alignment of weekly, quarterly and annual series onto the monthly calendar.

use crate::calendar::{from_month_index, month_index, month_start, quarter_start};
use crate::fill::{forward_fill, interpolate_interior};
use crate::series::{Aggregation, Frequency, Observation, ObservationSeries};
use chrono::{Datelike, NaiveDate};
use hearth_geo::EntityKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// How a quarterly value is spread over its quarter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuarterlyFill {
    /// Keep the value on the quarter's first month only.
    #[default]
    Broadcast,
    /// Linearly interpolate the months between consecutive quarters.
    Interpolate,
}

/// Configuration for [`FrequencyNormalizer`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Quarterly fill mode.
    pub quarterly_fill: QuarterlyFill,
    /// Month annual series are forward-filled up to. `None` stops at the last
    /// known point.
    pub as_of: Option<NaiveDate>,
}

/// Aligns series of any native frequency onto month-start dates.
#[derive(Debug, Clone, Default)]
pub struct FrequencyNormalizer {
    config: NormalizeConfig,
}

impl FrequencyNormalizer {
    /// Normalizer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizer with custom configuration.
    pub const fn with_config(config: NormalizeConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    pub const fn config(&self) -> &NormalizeConfig {
        &self.config
    }

    /// Convert a series to monthly frequency.
    ///
    /// - Monthly: dates snap to month start; duplicates within a month are averaged.
    /// - Weekly: mean of the weeks within each calendar month.
    /// - Quarterly: value lands on the quarter's first month, optionally
    ///   interpolated across the intervening months.
    /// - Annual: value lands on January 1, is interpolated between known years and
    ///   forward-filled to the `as_of` month.
    ///
    /// Every date in the result is a month start.
    pub fn normalize_to_monthly(
        &self,
        series: ObservationSeries,
        source_frequency: Frequency,
    ) -> ObservationSeries {
        let measure = series.measure;
        let input = series.len();
        let buckets = match source_frequency {
            Frequency::Monthly | Frequency::Weekly => bucket_mean(series, month_start),
            Frequency::Quarterly => bucket_mean(series, quarter_start),
            Frequency::Annual => bucket_mean(series, year_start),
        };

        let observations: Vec<Observation> = match source_frequency {
            Frequency::Monthly | Frequency::Weekly => flatten(buckets),
            Frequency::Quarterly => match self.config.quarterly_fill {
                QuarterlyFill::Broadcast => flatten(buckets),
                QuarterlyFill::Interpolate => expand(buckets, None, false),
            },
            Frequency::Annual => expand(buckets, self.config.as_of, true),
        };

        debug!(
            %measure,
            frequency = ?source_frequency,
            input,
            output = observations.len(),
            "normalized to monthly"
        );
        ObservationSeries::new(measure, Frequency::Monthly, observations)
    }
}

type Buckets = BTreeMap<EntityKey, BTreeMap<i32, Option<f64>>>;

fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

/// Group by (entity, snapped month) and average the non-null values.
fn bucket_mean(series: ObservationSeries, snap: fn(NaiveDate) -> NaiveDate) -> Buckets {
    let mut raw: BTreeMap<EntityKey, BTreeMap<i32, Vec<Option<f64>>>> = BTreeMap::new();
    for obs in series.observations {
        raw.entry(obs.entity)
            .or_default()
            .entry(month_index(snap(obs.date)))
            .or_default()
            .push(obs.value);
    }
    raw.into_iter()
        .map(|(entity, months)| {
            let months = months
                .into_iter()
                .map(|(m, values)| (m, Aggregation::Mean.apply(values)))
                .collect();
            (entity, months)
        })
        .collect()
}

fn flatten(buckets: Buckets) -> Vec<Observation> {
    buckets
        .into_iter()
        .flat_map(|(entity, months)| {
            months.into_iter().filter_map(move |(m, value)| {
                from_month_index(m).map(|date| Observation::new(entity.clone(), date, value))
            })
        })
        .collect()
}

/// Expand each entity to a dense monthly grid, interpolating interior gaps and
/// optionally forward-filling to `until`.
fn expand(buckets: Buckets, until: Option<NaiveDate>, extend: bool) -> Vec<Observation> {
    let mut out = Vec::new();
    for (entity, months) in buckets {
        let (Some(&first), Some(&last)) = (months.keys().next(), months.keys().next_back()) else {
            continue;
        };
        let end = match (extend, until) {
            (true, Some(until)) => last.max(month_index(until)),
            _ => last,
        };
        let positions: Vec<i32> = (first..=end).collect();
        let mut values: Vec<Option<f64>> = positions
            .iter()
            .map(|m| months.get(m).copied().flatten())
            .collect();
        interpolate_interior(&positions, &mut values);
        if extend {
            forward_fill(&mut values);
        }
        out.extend(positions.into_iter().zip(values).filter_map(|(m, value)| {
            from_month_index(m).map(|date| Observation::new(entity.clone(), date, value))
        }));
    }
    out
}
