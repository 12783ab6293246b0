//! The scoring primitive.
//!
//! [`ScoringEngine::score`] is a pure function of the snapshots and a
//! [`Methodology`]: it keeps no state between calls, so the same snapshots can be
//! re-scored under any number of methodologies.

use crate::error::{Result, ScoreError};
use crate::methodology::Methodology;
use crate::normalize::{Normalization, display_rescale};
use crate::weights::Component;
use crate::yield_estimate::{FallbackYield, YieldConfidence, YieldEstimate, YieldEstimator};
use chrono::NaiveDate;
use hearth_data::{Coverage, Measure};
use hearth_geo::EntityKey;
use hearth_metrics::MetricSnapshot;
use hearth_metrics::snapshot::{POPULATION_GROWTH, PRICE_3Y_CAGR, PRICE_YOY};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

/// Snapshot metric used for rent growth in the income blend.
pub const RENT_YOY: &str = "rent_yoy";

const INPUT_MEASURES: [Measure; 3] = [Measure::HomeValue, Measure::Rent, Measure::Population];

/// Inputs drawn from a snapshot, before blending and normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInputs {
    /// Latest home value.
    pub price: Option<f64>,
    /// Year-over-year price growth.
    pub price_yoy: Option<f64>,
    /// 3-year price CAGR.
    pub price_3y_cagr: Option<f64>,
    /// Population growth.
    pub population_growth: Option<f64>,
    /// Gross rental yield with provenance.
    pub rental_yield: Option<YieldEstimate>,
    /// Year-over-year rent growth.
    pub rent_yoy: Option<f64>,
}

/// One entity's score under one methodology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Entity.
    pub entity: EntityKey,
    /// Snapshot date.
    pub date: NaiveDate,
    /// Inputs taken from the snapshot.
    pub raw: RawInputs,
    /// Blended and scaled component values fed to normalization, indexed by
    /// [`Component::index`]. Imputed components are 0.
    pub inputs: [f64; Component::COUNT],
    /// Normalized component scores.
    pub components: [f64; Component::COUNT],
    /// Components with at least one missing input.
    pub imputed: [bool; Component::COUNT],
    /// Weighted sum of the component scores.
    pub composite: f64,
    /// Composite on the display scale.
    pub display_score: f64,
    /// 1-based rank; tied composites share a rank.
    pub rank: usize,
    /// Provenance of the snapshot's measure values.
    pub coverage: [Coverage; Measure::COUNT],
    /// Whether any input was interpolated, filled or assumed.
    pub estimated: bool,
    /// Whether the entity has the full history window.
    pub full_history: bool,
}

impl ScoreResult {
    /// Normalized score of one component.
    pub const fn component(&self, component: Component) -> f64 {
        self.components[component.index()]
    }

    /// Whether one component was zero-filled.
    pub const fn is_imputed(&self, component: Component) -> bool {
        self.imputed[component.index()]
    }

    /// Provenance of the yield, if one was available.
    pub fn yield_confidence(&self) -> Option<YieldConfidence> {
        self.raw.rental_yield.map(|y| y.confidence)
    }
}

/// Results of one methodology, in rank order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreTable {
    methodology: Methodology,
    results: Vec<ScoreResult>,
}

impl ScoreTable {
    /// Methodology that produced the table.
    pub const fn methodology(&self) -> &Methodology {
        &self.methodology
    }

    /// Methodology name.
    pub fn name(&self) -> &str {
        &self.methodology.name
    }

    /// Results, best first.
    pub fn results(&self) -> &[ScoreResult] {
        &self.results
    }

    /// Number of ranked entities.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Result for an entity.
    pub fn get(&self, entity: &EntityKey) -> Option<&ScoreResult> {
        self.results.iter().find(|r| &r.entity == entity)
    }

    /// The `n` best results.
    pub fn top(&self, n: usize) -> &[ScoreResult] {
        &self.results[..n.min(self.results.len())]
    }
}

/// Scores snapshots under a methodology.
#[derive(Debug)]
pub struct ScoringEngine {
    yield_estimator: Box<dyn YieldEstimator>,
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringEngine {
    /// Engine using observed yields with the price-tier fallback.
    pub fn new() -> Self {
        Self {
            yield_estimator: Box::new(FallbackYield::default()),
        }
    }

    /// Replace the yield estimator.
    pub fn with_yield_estimator(mut self, estimator: impl YieldEstimator + 'static) -> Self {
        self.yield_estimator = Box::new(estimator);
        self
    }

    /// Score every snapshot.
    ///
    /// The methodology is validated first; invalid weights are an error and are
    /// never renormalized. A missing input contributes a raw value of 0 to its
    /// component and the component is flagged as imputed, so every entity gets a
    /// complete score.
    pub fn score(&self, snapshots: &[MetricSnapshot], methodology: &Methodology) -> Result<ScoreTable> {
        methodology.validate()?;
        if snapshots.is_empty() {
            return Err(ScoreError::EmptySnapshot);
        }

        let prepared: Vec<Prepared> = snapshots
            .iter()
            .map(|snapshot| self.prepare(snapshot, methodology))
            .collect();

        let mut normalized = Vec::with_capacity(Component::COUNT);
        for component in Component::ALL {
            let column: Array1<f64> = prepared.iter().map(|p| p.inputs[component.index()]).collect();
            let imputed = prepared.iter().filter(|p| p.imputed[component.index()]).count();
            if imputed > 0 {
                debug!(
                    methodology = %methodology.name,
                    %component,
                    imputed,
                    "zero-filled missing component inputs"
                );
            }
            normalized.push(methodology.normalization.normalize(&column));
        }

        let mut results: Vec<ScoreResult> = prepared
            .into_iter()
            .zip(snapshots)
            .enumerate()
            .map(|(i, (prepared, snapshot))| {
                let components = Component::ALL.map(|c| normalized[c.index()][i]);
                let composite: f64 = Component::ALL
                    .iter()
                    .map(|c| methodology.weights.weight(*c) * components[c.index()])
                    .sum();
                let display_score = match methodology.normalization {
                    Normalization::ZScore if methodology.rescale_display => display_rescale(composite),
                    _ => composite,
                };
                let estimated = prepared.raw.rental_yield.is_some_and(|y| y.is_estimated())
                    || INPUT_MEASURES
                        .iter()
                        .any(|m| snapshot.coverage_of(*m).is_estimated());
                ScoreResult {
                    entity: snapshot.entity.clone(),
                    date: snapshot.date,
                    raw: prepared.raw,
                    inputs: prepared.inputs,
                    components,
                    imputed: prepared.imputed,
                    composite,
                    display_score,
                    rank: 0,
                    coverage: snapshot.coverage,
                    estimated,
                    full_history: snapshot.full_history,
                }
            })
            .collect();
        assign_ranks(&mut results);

        info!(
            methodology = %methodology.name,
            normalization = %methodology.normalization,
            entities = results.len(),
            estimated = results.iter().filter(|r| r.estimated).count(),
            "scored methodology"
        );
        Ok(ScoreTable {
            methodology: methodology.clone(),
            results,
        })
    }

    /// Score the same snapshots under several methodologies.
    pub fn score_all(
        &self,
        snapshots: &[MetricSnapshot],
        methodologies: &[Methodology],
    ) -> Result<Vec<ScoreTable>> {
        methodologies
            .iter()
            .map(|methodology| self.score(snapshots, methodology))
            .collect()
    }

    fn prepare(&self, snapshot: &MetricSnapshot, methodology: &Methodology) -> Prepared {
        let price_yoy = snapshot.metric(PRICE_YOY);
        let mut price_3y_cagr = snapshot.metric(PRICE_3Y_CAGR);
        if methodology.cagr_fallback && price_3y_cagr.is_none() {
            price_3y_cagr = price_yoy;
        }
        let raw = RawInputs {
            price: snapshot.price(),
            price_yoy,
            price_3y_cagr,
            population_growth: snapshot.metric(POPULATION_GROWTH),
            rental_yield: self.yield_estimator.estimate(snapshot),
            rent_yoy: snapshot.metric(RENT_YOY),
        };

        let growth = methodology.growth;
        let income = methodology.income;
        let blends: [Vec<(f64, Option<f64>)>; Component::COUNT] = [
            vec![(1.0, raw.price)],
            vec![(growth.yoy, raw.price_yoy), (growth.cagr, raw.price_3y_cagr)],
            vec![(1.0, raw.population_growth)],
            vec![
                (income.rental_yield, raw.rental_yield.map(|y| y.value)),
                (income.rent_growth, raw.rent_yoy),
            ],
        ];

        let mut inputs = [0.0; Component::COUNT];
        let mut imputed = [false; Component::COUNT];
        for component in Component::ALL {
            let parts = &blends[component.index()];
            let missing = parts.iter().any(|(w, v)| *w > 0.0 && v.is_none());
            let blended: f64 = parts.iter().map(|(w, v)| w * v.unwrap_or(0.0)).sum();
            let scaled = if missing {
                None
            } else {
                methodology.scales.scale(component).apply(blended)
            };
            match scaled {
                Some(value) if component == Component::Affordability => inputs[component.index()] = -value,
                Some(value) => inputs[component.index()] = value,
                None => imputed[component.index()] = true,
            }
        }

        Prepared {
            raw,
            inputs,
            imputed,
        }
    }
}

struct Prepared {
    raw: RawInputs,
    inputs: [f64; Component::COUNT],
    imputed: [bool; Component::COUNT],
}

/// Sort best first and assign competition ranks (1, 1, 3). Ties are listed in
/// entity order.
fn assign_ranks(results: &mut [ScoreResult]) {
    results.sort_by(|a, b| match b.composite.total_cmp(&a.composite) {
        Ordering::Equal => a.entity.cmp(&b.entity),
        other => other,
    });
    let mut previous: Option<(f64, usize)> = None;
    for (i, result) in results.iter_mut().enumerate() {
        let rank = match previous {
            Some((composite, rank)) if composite == result.composite => rank,
            _ => i + 1,
        };
        result.rank = rank;
        previous = Some((result.composite, rank));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::Scale;
    use crate::weights::ScoringWeights;
    use crate::yield_estimate::tests::snapshot;
    use crate::yield_estimate::PriceTierYield;
    use approx::assert_relative_eq;
    use hearth_geo::CbsaCode;

    fn metro(code: &str) -> EntityKey {
        EntityKey::Metro(CbsaCode::parse(code).unwrap())
    }

    fn market(code: &str, price: f64, yoy: f64, cagr: Option<f64>, population: Option<f64>) -> MetricSnapshot {
        let mut s = snapshot(code, price, Some(1_500.0));
        s.metrics.insert(PRICE_YOY.to_string(), yoy);
        if let Some(cagr) = cagr {
            s.metrics.insert(PRICE_3Y_CAGR.to_string(), cagr);
        }
        if let Some(population) = population {
            s.metrics.insert(POPULATION_GROWTH.to_string(), population);
        }
        s
    }

    fn markets() -> Vec<MetricSnapshot> {
        vec![
            market("31080", 300_000.0, 0.03, Some(0.04), Some(0.01)),
            market("12420", 200_000.0, 0.05, Some(0.04), Some(0.02)),
            market("19100", 400_000.0, 0.01, Some(0.04), Some(0.00)),
        ]
    }

    #[test]
    fn test_balanced_min_max() {
        let table = ScoringEngine::new().score(&markets(), &Methodology::balanced()).unwrap();
        let ranked: Vec<_> = table.results().iter().map(|r| (r.entity.code(), r.rank)).collect();
        assert_eq!(ranked, vec![("12420", 1), ("31080", 2), ("19100", 3)]);

        let best = &table.results()[0];
        assert_relative_eq!(best.composite, 100.0, epsilon = 1e-9);
        assert_relative_eq!(best.component(Component::Affordability), 100.0);

        let middle = table.get(&metro("31080")).unwrap();
        assert_relative_eq!(middle.component(Component::Growth), 50.0, epsilon = 1e-9);
        assert_relative_eq!(middle.component(Component::Income), 100.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(middle.composite, 45.0 + 10.0 / 3.0, epsilon = 1e-9);
        assert_eq!(middle.display_score, middle.composite);

        for result in table.results() {
            for component in Component::ALL {
                assert!((0.0..=100.0).contains(&result.component(component)));
            }
        }
    }

    #[test]
    fn test_affordability_negates_price_before_normalizing() {
        let table = ScoringEngine::new().score(&markets(), &Methodology::balanced()).unwrap();
        let cheapest = table.get(&metro("12420")).unwrap();
        let priciest = table.get(&metro("19100")).unwrap();
        assert_eq!(cheapest.inputs[Component::Affordability.index()], -200_000.0);
        assert_eq!(cheapest.component(Component::Affordability), 100.0);
        assert_eq!(priciest.component(Component::Affordability), 0.0);
    }

    #[test]
    fn test_invalid_weights_are_rejected() {
        let methodology = Methodology::balanced().with_weights(ScoringWeights {
            affordability: 0.3,
            growth: 0.3,
            demographic: 0.3,
            income: 0.3,
        });
        let err = ScoringEngine::new().score(&markets(), &methodology).unwrap_err();
        assert!(matches!(err, ScoreError::InvalidWeights { .. }));
    }

    #[test]
    fn test_empty_snapshots() {
        let err = ScoringEngine::new().score(&[], &Methodology::balanced()).unwrap_err();
        assert_eq!(err, ScoreError::EmptySnapshot);
    }

    #[test]
    fn test_missing_inputs_are_zero_filled() {
        let mut snapshots = markets();
        snapshots.push(market("41860", 900_000.0, 0.02, None, None));
        let table = ScoringEngine::new().score(&snapshots, &Methodology::balanced()).unwrap();
        assert_eq!(table.len(), 4);
        let partial = table.get(&metro("41860")).unwrap();
        assert!(partial.is_imputed(Component::Demographic));
        assert!(partial.is_imputed(Component::Growth));
        assert!(!partial.is_imputed(Component::Affordability));
        assert_eq!(partial.inputs[Component::Demographic.index()], 0.0);
        assert!(partial.composite.is_finite());
    }

    #[test]
    fn test_cagr_fallback() {
        let snapshots = vec![
            market("12420", 200_000.0, 0.05, None, Some(0.01)),
            market("31080", 300_000.0, 0.02, Some(0.03), Some(0.01)),
        ];
        let table = ScoringEngine::new().score(&snapshots, &Methodology::z_score()).unwrap();
        let filled = table.get(&metro("12420")).unwrap();
        assert_eq!(filled.raw.price_3y_cagr, Some(0.05));
        assert!(!filled.is_imputed(Component::Growth));
    }

    #[test]
    fn test_ties_share_rank() {
        let snapshots = vec![
            market("31080", 300_000.0, 0.03, Some(0.04), Some(0.01)),
            market("19100", 300_000.0, 0.03, Some(0.04), Some(0.01)),
            market("12420", 300_000.0, 0.03, Some(0.04), Some(0.01)),
        ];
        let table = ScoringEngine::new().score(&snapshots, &Methodology::balanced()).unwrap();
        let ranked: Vec<_> = table.results().iter().map(|r| (r.entity.code(), r.rank)).collect();
        assert_eq!(
            ranked,
            vec![("12420", 1), ("19100", 1), ("31080", 1)]
        );
        assert_relative_eq!(table.results()[0].composite, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_competition_ranking() {
        let mut snapshots = markets();
        snapshots.push(market("41860", 300_000.0, 0.03, Some(0.04), Some(0.01)));
        let table = ScoringEngine::new().score(&snapshots, &Methodology::balanced()).unwrap();
        let ranks: Vec<_> = table.results().iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 2, 4]);
    }

    #[test]
    fn test_z_score_display_range() {
        let table = ScoringEngine::new().score(&markets(), &Methodology::z_score()).unwrap();
        for result in table.results() {
            assert!((0.0..=100.0).contains(&result.display_score));
        }
        let sum: f64 = table.results().iter().map(|r| r.composite).sum();
        assert_relative_eq!(sum, 0.0, epsilon = 1e-9);
        assert_eq!(table.results()[0].entity, metro("12420"));
    }

    #[test]
    fn test_estimated_yield_is_flagged() {
        let mut snapshots = markets();
        snapshots[0].values[Measure::Rent.index()] = None;
        let table = ScoringEngine::new().score(&snapshots, &Methodology::balanced()).unwrap();
        let result = table.get(&metro("31080")).unwrap();
        assert!(result.estimated);
        assert_eq!(result.yield_confidence(), Some(YieldConfidence::Estimated));
        assert!(!table.get(&metro("12420")).unwrap().estimated);
    }

    #[test]
    fn test_custom_yield_estimator() {
        let engine = ScoringEngine::new().with_yield_estimator(PriceTierYield::default());
        let table = engine.score(&markets(), &Methodology::balanced()).unwrap();
        assert!(table.results().iter().all(|r| r.estimated));
    }

    #[test]
    fn test_log_scale_outside_domain_is_imputed() {
        let mut methodology = Methodology::balanced();
        methodology.scales.growth = Scale::Log;
        let snapshots = vec![
            market("12420", 200_000.0, -1.5, Some(-1.5), Some(0.01)),
            market("31080", 300_000.0, 0.02, Some(0.03), Some(0.01)),
        ];
        let table = ScoringEngine::new().score(&snapshots, &methodology).unwrap();
        assert!(table.get(&metro("12420")).unwrap().is_imputed(Component::Growth));
        assert!(!table.get(&metro("31080")).unwrap().is_imputed(Component::Growth));
    }
}
