//! Markdown comparison of several methodologies.

use hearth_geo::{EntityKey, GeoKeyResolver};
use hearth_score::{
    BlendedRank, Component, MethodologyComparison, ScoreError, ScoreTable, blended_ranking,
    compare_all,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default number of entities listed per section.
pub const DEFAULT_TOP_N: usize = 10;

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v * 100.0))
}

/// A side-by-side summary of several score tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Score tables, in the order given.
    pub tables: Vec<ScoreTable>,
    /// Each table after the first compared against the first.
    pub comparisons: Vec<MethodologyComparison>,
    /// Ranking by mean display score.
    pub blended: Vec<BlendedRank>,
    /// Display names by entity.
    pub names: BTreeMap<EntityKey, String>,
    /// Entities listed per section.
    pub top_n: usize,
}

impl ComparisonReport {
    /// Build the report. All tables must rank the same entities.
    pub fn new(tables: Vec<ScoreTable>, resolver: Option<&GeoKeyResolver>) -> Result<Self, ScoreError> {
        let comparisons = compare_all(&tables)?;
        let blended = blended_ranking(&tables)?;
        let names = blended
            .iter()
            .map(|b| {
                let name = resolver
                    .and_then(|r| r.display_name(&b.entity))
                    .unwrap_or_else(|| b.entity.code().to_string());
                (b.entity.clone(), name)
            })
            .collect();
        Ok(Self {
            tables,
            comparisons,
            blended,
            names,
            top_n: DEFAULT_TOP_N,
        })
    }

    /// Change the number of entities listed per section.
    pub const fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    fn name<'a>(&'a self, entity: &'a EntityKey) -> &'a str {
        self.names.get(entity).map_or_else(|| entity.code(), String::as_str)
    }

    /// Format as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str("# Housing Market Rankings\n\n");
        if let Some(date) = self
            .tables
            .first()
            .and_then(|t| t.results().iter().map(|r| r.date).max())
        {
            output.push_str(&format!("**As of:** {date}\n\n"));
        }

        for table in &self.tables {
            let methodology = table.methodology();
            output.push_str(&format!("## {}\n\n", methodology.name));
            output.push_str(&format!(
                "Normalization: {}. Weights: ",
                methodology.normalization
            ));
            let weights: Vec<String> = Component::ALL
                .iter()
                .map(|c| format!("{c} {:.0}%", methodology.weights.weight(*c) * 100.0))
                .collect();
            output.push_str(&weights.join(", "));
            output.push_str(".\n\n");

            output.push_str("| Rank | Market | Score | Price | YoY | 3Y CAGR | Yield | Flags |\n");
            output.push_str("|------|--------|-------|-------|-----|---------|-------|-------|\n");
            for result in table.top(self.top_n) {
                let mut flags = Vec::new();
                if result.estimated {
                    flags.push("estimated");
                }
                if Component::ALL.iter().any(|c| result.is_imputed(*c)) {
                    flags.push("imputed");
                }
                if !result.full_history {
                    flags.push("short history");
                }
                output.push_str(&format!(
                    "| {} | {} | {:.1} | {} | {} | {} | {} | {} |\n",
                    result.rank,
                    self.name(&result.entity),
                    result.display_score,
                    result
                        .raw
                        .price
                        .map_or_else(|| "n/a".to_string(), |p| format!("${p:.0}")),
                    percent(result.raw.price_yoy),
                    percent(result.raw.price_3y_cagr),
                    percent(result.raw.rental_yield.map(|y| y.value)),
                    flags.join(", "),
                ));
            }
            output.push('\n');
        }

        if !self.comparisons.is_empty() {
            output.push_str("## Methodology Agreement\n\n");
            output.push_str("| Base | Other | Pearson | Spearman | Max rank change |\n");
            output.push_str("|------|-------|---------|----------|-----------------|\n");
            for comparison in &self.comparisons {
                output.push_str(&format!(
                    "| {} | {} | {:.3} | {:.3} | {} |\n",
                    comparison.base,
                    comparison.other,
                    comparison.pearson,
                    comparison.spearman,
                    comparison.max_rank_change(),
                ));
            }
            output.push('\n');

            for comparison in &self.comparisons {
                let gainers = comparison.gainers(self.top_n);
                let losers = comparison.losers(self.top_n);
                if gainers.is_empty() && losers.is_empty() {
                    continue;
                }
                output.push_str(&format!(
                    "### {} vs {}\n\n",
                    comparison.other, comparison.base
                ));
                for change in gainers.into_iter().chain(losers) {
                    output.push_str(&format!(
                        "- {}: {} -> {} ({:+})\n",
                        self.name(&change.entity),
                        change.base_rank,
                        change.other_rank,
                        change.change,
                    ));
                }
                output.push('\n');
            }
        }

        if self.tables.len() > 1 {
            output.push_str("## Blended Ranking\n\n");
            output.push_str("| Rank | Market | Mean score |\n");
            output.push_str("|------|--------|------------|\n");
            for entry in self.blended.iter().take(self.top_n) {
                output.push_str(&format!(
                    "| {} | {} | {:.1} |\n",
                    entry.rank,
                    self.name(&entry.entity),
                    entry.mean_score,
                ));
            }
        }

        output
    }
}
