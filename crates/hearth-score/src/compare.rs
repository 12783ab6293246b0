//! Comparing rankings produced by different methodologies.
//!
//! Comparison is a reporting layer on top of [`ScoreTable`]s; it never re-scores
//! anything.

use crate::engine::{ScoreResult, ScoreTable};
use crate::error::{Result, ScoreError};
use hearth_geo::EntityKey;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::info;

/// Pearson correlation of two equally long arrays.
///
/// Pairs with a non-finite member are skipped. Returns NaN with fewer than two
/// usable pairs, on a length mismatch, or when either side has zero variance.
pub fn pearson(x: &Array1<f64>, y: &Array1<f64>) -> f64 {
    if x.len() != y.len() {
        return f64::NAN;
    }
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| (*a, *b))
        .unzip();
    correlation(&xs, &ys)
}

/// Spearman rank correlation: Pearson correlation of average ranks.
pub fn spearman(x: &Array1<f64>, y: &Array1<f64>) -> f64 {
    if x.len() != y.len() {
        return f64::NAN;
    }
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(a, b)| (*a, *b))
        .unzip();
    correlation(&compute_ranks(&xs), &compute_ranks(&ys))
}

/// 1-based ascending ranks; ties get their average rank.
pub fn compute_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n && indexed[j].1 == indexed[i].1 {
            j += 1;
        }
        let average = (i + j + 1) as f64 / 2.0;
        for (idx, _) in &indexed[i..j] {
            ranks[*idx] = average;
        }
        i = j;
    }
    ranks
}

fn correlation(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n < 2 || n != y.len() {
        return f64::NAN;
    }
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// How one entity moved between two rankings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankChange {
    /// Entity.
    pub entity: EntityKey,
    /// Rank under the base methodology.
    pub base_rank: usize,
    /// Rank under the other methodology.
    pub other_rank: usize,
    /// `base_rank - other_rank`; positive means the entity moved up.
    pub change: i64,
    /// Display score under the base methodology.
    pub base_score: f64,
    /// Display score under the other methodology.
    pub other_score: f64,
}

fn by_entity(table: &ScoreTable) -> BTreeMap<&EntityKey, &ScoreResult> {
    table.results().iter().map(|r| (&r.entity, r)).collect()
}

fn check_same_entities(base: &ScoreTable, other: &ScoreTable) -> Result<()> {
    let left = by_entity(base);
    let right = by_entity(other);
    let missing = left
        .keys()
        .find(|e| !right.contains_key(*e))
        .map(|e| format!("{e} missing from {}", other.name()))
        .or_else(|| {
            right
                .keys()
                .find(|e| !left.contains_key(*e))
                .map(|e| format!("{e} missing from {}", base.name()))
        });
    missing.map_or(Ok(()), |detail| Err(ScoreError::MismatchedTables(detail)))
}

/// Agreement between two methodologies over the same entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodologyComparison {
    /// Base methodology name.
    pub base: String,
    /// Other methodology name.
    pub other: String,
    /// Pearson correlation of composite scores.
    pub pearson: f64,
    /// Spearman correlation of composite scores.
    pub spearman: f64,
    /// Per-entity rank movement, in base rank order.
    pub changes: Vec<RankChange>,
}

impl MethodologyComparison {
    /// Compare `other` against `base`. Both tables must rank the same entities.
    pub fn compare(base: &ScoreTable, other: &ScoreTable) -> Result<Self> {
        check_same_entities(base, other)?;
        let others = by_entity(other);

        let mut changes = Vec::with_capacity(base.len());
        let mut base_scores = Vec::with_capacity(base.len());
        let mut other_scores = Vec::with_capacity(base.len());
        for result in base.results() {
            let Some(moved) = others.get(&result.entity) else {
                continue;
            };
            base_scores.push(result.composite);
            other_scores.push(moved.composite);
            changes.push(RankChange {
                entity: result.entity.clone(),
                base_rank: result.rank,
                other_rank: moved.rank,
                change: result.rank as i64 - moved.rank as i64,
                base_score: result.display_score,
                other_score: moved.display_score,
            });
        }

        let x = Array1::from(base_scores);
        let y = Array1::from(other_scores);
        let comparison = Self {
            base: base.name().to_string(),
            other: other.name().to_string(),
            pearson: pearson(&x, &y),
            spearman: spearman(&x, &y),
            changes,
        };
        info!(
            base = %comparison.base,
            other = %comparison.other,
            pearson = comparison.pearson,
            spearman = comparison.spearman,
            moved = comparison.changes.iter().filter(|c| c.change != 0).count(),
            "compared methodologies"
        );
        Ok(comparison)
    }

    /// Up to `n` entities that moved up the most.
    pub fn gainers(&self, n: usize) -> Vec<&RankChange> {
        let mut moved: Vec<_> = self.changes.iter().filter(|c| c.change > 0).collect();
        moved.sort_by(|a, b| b.change.cmp(&a.change).then_with(|| a.entity.cmp(&b.entity)));
        moved.truncate(n);
        moved
    }

    /// Up to `n` entities that moved down the most.
    pub fn losers(&self, n: usize) -> Vec<&RankChange> {
        let mut moved: Vec<_> = self.changes.iter().filter(|c| c.change < 0).collect();
        moved.sort_by(|a, b| a.change.cmp(&b.change).then_with(|| a.entity.cmp(&b.entity)));
        moved.truncate(n);
        moved
    }

    /// Largest absolute rank movement.
    pub fn max_rank_change(&self) -> u64 {
        self.changes
            .iter()
            .map(|c| c.change.unsigned_abs())
            .max()
            .unwrap_or(0)
    }
}

/// Compare every table after the first against the first.
pub fn compare_all(tables: &[ScoreTable]) -> Result<Vec<MethodologyComparison>> {
    let Some((base, others)) = tables.split_first() else {
        return Ok(Vec::new());
    };
    others
        .iter()
        .map(|other| MethodologyComparison::compare(base, other))
        .collect()
}

/// An entity's standing across several methodologies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendedRank {
    /// Entity.
    pub entity: EntityKey,
    /// Mean display score across methodologies.
    pub mean_score: f64,
    /// Rank by `mean_score`; ties share a rank.
    pub rank: usize,
    /// Rank under each methodology, by methodology name.
    pub ranks: BTreeMap<String, usize>,
}

/// Rank entities by their mean display score across `tables`.
pub fn blended_ranking(tables: &[ScoreTable]) -> Result<Vec<BlendedRank>> {
    let Some(first) = tables.first() else {
        return Err(ScoreError::EmptySnapshot);
    };
    for table in &tables[1..] {
        check_same_entities(first, table)?;
    }

    let mut blended: Vec<BlendedRank> = first
        .results()
        .iter()
        .map(|result| {
            let per_table: Vec<&ScoreResult> = tables
                .iter()
                .filter_map(|table| table.get(&result.entity))
                .collect();
            let mean_score =
                per_table.iter().map(|r| r.display_score).sum::<f64>() / per_table.len() as f64;
            let ranks = tables
                .iter()
                .zip(&per_table)
                .map(|(table, r)| (table.name().to_string(), r.rank))
                .collect();
            BlendedRank {
                entity: result.entity.clone(),
                mean_score,
                rank: 0,
                ranks,
            }
        })
        .collect();

    blended.sort_by(|a, b| match b.mean_score.total_cmp(&a.mean_score) {
        Ordering::Equal => a.entity.cmp(&b.entity),
        other => other,
    });
    let mut previous: Option<(f64, usize)> = None;
    for (i, entry) in blended.iter_mut().enumerate() {
        let rank = match previous {
            Some((score, rank)) if score == entry.mean_score => rank,
            _ => i + 1,
        };
        entry.rank = rank;
        previous = Some((entry.mean_score, rank));
    }
    Ok(blended)
}
