//! Long-form observation series.

use crate::calendar::month_start;
use chrono::{Datelike, NaiveDate};
use hearth_geo::{EntityKey, GeoLevel};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// Harmonized measures carried by the master table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// Typical home value (Zillow ZHVI).
    HomeValue,
    /// Typical monthly rent (Zillow ZORI).
    Rent,
    /// Total nonfarm employment.
    Employment,
    /// Average wage.
    Wage,
    /// Resident population.
    Population,
    /// 30-year fixed mortgage rate (national).
    MortgageRate,
    /// FHFA house price index.
    Hpi,
    /// For-sale inventory.
    Inventory,
}

/// How county values combine into a metro value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Sum of the non-null county values (counts of people or jobs).
    Sum,
    /// Mean of the non-null county values (prices, rates, indices).
    Mean,
}

impl Aggregation {
    /// Aggregate values, ignoring nulls. All-null input yields `None`.
    pub fn apply(&self, values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
        let (sum, count) = values
            .into_iter()
            .flatten()
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        match (self, count) {
            (_, 0) => None,
            (Self::Sum, _) => Some(sum),
            (Self::Mean, n) => Some(sum / n as f64),
        }
    }
}

impl Measure {
    /// Number of measures.
    pub const COUNT: usize = 8;

    /// All measures in column order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::HomeValue,
        Self::Rent,
        Self::Employment,
        Self::Wage,
        Self::Population,
        Self::MortgageRate,
        Self::Hpi,
        Self::Inventory,
    ];

    /// Position in [`Measure::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable output column name.
    pub const fn column(self) -> &'static str {
        match self {
            Self::HomeValue => "home_value",
            Self::Rent => "rent",
            Self::Employment => "employment",
            Self::Wage => "wage",
            Self::Population => "population",
            Self::MortgageRate => "mortgage_rate",
            Self::Hpi => "hpi",
            Self::Inventory => "inventory",
        }
    }

    /// How county values of this measure roll up to a metro.
    pub const fn rollup(self) -> Aggregation {
        match self {
            Self::Population | Self::Employment | Self::Inventory => Aggregation::Sum,
            _ => Aggregation::Mean,
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Measure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.column() == s)
            .ok_or_else(|| format!("unknown measure: {s}"))
    }
}

/// Native publication frequency of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Weekly (e.g. Freddie Mac PMMS).
    Weekly,
    /// Monthly.
    Monthly,
    /// Quarterly (e.g. QCEW wages, FHFA HPI).
    Quarterly,
    /// Annual (e.g. Census population estimates).
    Annual,
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" | "w" => Ok(Self::Weekly),
            "monthly" | "m" => Ok(Self::Monthly),
            "quarterly" | "q" => Ok(Self::Quarterly),
            "annual" | "yearly" | "a" => Ok(Self::Annual),
            other => Err(format!("unknown frequency: {other}")),
        }
    }
}

/// One value for one entity at one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Entity the value belongs to.
    pub entity: EntityKey,
    /// Observation date.
    pub date: NaiveDate,
    /// Value, `None` when the source published a blank.
    pub value: Option<f64>,
}

impl Observation {
    /// Create an observation; non-finite values are stored as null.
    pub fn new(entity: EntityKey, date: NaiveDate, value: Option<f64>) -> Self {
        Self {
            entity,
            date,
            value: value.filter(|v| v.is_finite()),
        }
    }
}

/// A single measure for many entities over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationSeries {
    /// What is being measured.
    pub measure: Measure,
    /// Frequency of the dates in `observations`.
    pub frequency: Frequency,
    /// The observations, in no particular order until [`ObservationSeries::sort`].
    pub observations: Vec<Observation>,
}

impl ObservationSeries {
    /// Create a series.
    pub const fn new(measure: Measure, frequency: Frequency, observations: Vec<Observation>) -> Self {
        Self {
            measure,
            frequency,
            observations,
        }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Whether every observation is national, making the series a broadcast candidate.
    pub fn is_national(&self) -> bool {
        !self.is_empty()
            && self
                .observations
                .iter()
                .all(|o| matches!(o.entity, EntityKey::National))
    }

    /// Geographic level shared by every observation, if homogeneous.
    pub fn level(&self) -> Option<GeoLevel> {
        let first = self.observations.first()?.entity.level();
        self.observations
            .iter()
            .all(|o| o.entity.level() == first)
            .then_some(first)
    }

    /// Whether every date is a month start.
    pub fn is_month_aligned(&self) -> bool {
        self.observations.iter().all(|o| o.date.day() == 1)
    }

    /// Distinct entities in the series.
    pub fn entities(&self) -> BTreeSet<&EntityKey> {
        self.observations.iter().map(|o| &o.entity).collect()
    }

    /// Sort ascending by (entity, date).
    pub fn sort(&mut self) {
        self.observations
            .sort_by(|a, b| (&a.entity, a.date).cmp(&(&b.entity, b.date)));
    }

    /// Keep at most one observation per (entity, date), preferring the first non-null.
    ///
    /// Leaves the series sorted. Returns the number of observations removed.
    pub fn dedup(&mut self) -> usize {
        self.sort();
        let before = self.observations.len();
        let mut kept: Vec<Observation> = Vec::with_capacity(before);
        for obs in self.observations.drain(..) {
            match kept.last_mut() {
                Some(last) if last.entity == obs.entity && last.date == obs.date => {
                    if last.value.is_none() {
                        last.value = obs.value;
                    }
                }
                _ => kept.push(obs),
            }
        }
        self.observations = kept;
        before - self.observations.len()
    }

    /// Snap every date to its month start without merging duplicates.
    pub fn snap_to_month_start(&mut self) {
        for obs in &mut self.observations {
            obs.date = month_start(obs.date);
        }
    }

    /// Append another series of the same measure.
    pub fn extend(&mut self, other: Self) {
        self.observations.extend(other.observations);
    }

    /// Observations grouped per entity, each group sorted by date.
    pub fn by_entity(&self) -> BTreeMap<EntityKey, Vec<(NaiveDate, Option<f64>)>> {
        let mut groups: BTreeMap<EntityKey, Vec<(NaiveDate, Option<f64>)>> = BTreeMap::new();
        for obs in &self.observations {
            groups
                .entry(obs.entity.clone())
                .or_default()
                .push((obs.date, obs.value));
        }
        for points in groups.values_mut() {
            points.sort_by_key(|(date, _)| *date);
        }
        groups
    }

    /// Non-null values indexed by (entity, date); the first non-null wins.
    pub fn index(&self) -> HashMap<(EntityKey, NaiveDate), f64> {
        let mut index = HashMap::with_capacity(self.observations.len());
        for obs in &self.observations {
            if let Some(value) = obs.value {
                index.entry((obs.entity.clone(), obs.date)).or_insert(value);
            }
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_geo::{CbsaCode, Fips};

    fn county(code: &str) -> EntityKey {
        EntityKey::County(Fips::parse(code).unwrap())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_measure_index_matches_all() {
        for (i, measure) in Measure::ALL.iter().enumerate() {
            assert_eq!(measure.index(), i);
            assert_eq!(measure.column().parse::<Measure>().unwrap(), *measure);
        }
    }

    #[test]
    fn test_aggregation() {
        let values = [Some(1.0), None, Some(3.0)];
        assert_eq!(Aggregation::Sum.apply(values), Some(4.0));
        assert_eq!(Aggregation::Mean.apply(values), Some(2.0));
        assert_eq!(Aggregation::Sum.apply([None, None]), None);
    }

    #[test]
    fn test_non_finite_is_null() {
        let obs = Observation::new(county("06037"), date(2024, 1, 1), Some(f64::NAN));
        assert_eq!(obs.value, None);
    }

    #[test]
    fn test_dedup_prefers_first_non_null() {
        let mut series = ObservationSeries::new(
            Measure::HomeValue,
            Frequency::Monthly,
            vec![
                Observation::new(county("06037"), date(2024, 2, 1), Some(2.0)),
                Observation::new(county("06037"), date(2024, 1, 1), None),
                Observation::new(county("06037"), date(2024, 1, 1), Some(1.0)),
                Observation::new(county("06037"), date(2024, 1, 1), Some(9.0)),
            ],
        );
        assert_eq!(series.dedup(), 2);
        assert_eq!(series.len(), 2);
        assert_eq!(series.observations[0].value, Some(1.0));
        assert_eq!(series.observations[1].date, date(2024, 2, 1));
    }

    #[test]
    fn test_national_and_level() {
        let national = ObservationSeries::new(
            Measure::MortgageRate,
            Frequency::Weekly,
            vec![Observation::new(EntityKey::National, date(2024, 1, 4), Some(6.6))],
        );
        assert!(national.is_national());
        assert_eq!(national.level(), Some(GeoLevel::National));

        let mixed = ObservationSeries::new(
            Measure::Rent,
            Frequency::Monthly,
            vec![
                Observation::new(county("06037"), date(2024, 1, 1), Some(1.0)),
                Observation::new(
                    EntityKey::Metro(CbsaCode::parse("31080").unwrap()),
                    date(2024, 1, 1),
                    Some(1.0),
                ),
            ],
        );
        assert!(!mixed.is_national());
        assert_eq!(mixed.level(), None);
    }
}
