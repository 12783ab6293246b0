//! Flat rows with stable column names.

use chrono::NaiveDate;
use hearth_data::{Coverage, MasterRecord, MasterTable, Measure};
use hearth_geo::{EntityKey, GeoKeyResolver};
use hearth_score::{Component, ScoreResult, ScoreTable, YieldConfidence};
use serde::{Deserialize, Serialize};

/// Separator used when several labels share one CSV cell.
pub const LIST_SEPARATOR: &str = ";";

fn display_name(entity: &EntityKey, resolver: Option<&GeoKeyResolver>) -> String {
    resolver
        .and_then(|r| r.display_name(entity))
        .unwrap_or_else(|| entity.code().to_string())
}

/// One ranked entity under one methodology.
///
/// Field order is the column order of every export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    /// Methodology name.
    pub methodology: String,
    /// 1-based rank.
    pub rank: usize,
    /// `county`, `metro` or `national`.
    pub geo_level: String,
    /// FIPS or CBSA code.
    pub geo_code: String,
    /// Display name, or the code when none is known.
    pub name: String,
    /// Snapshot month.
    pub date: NaiveDate,
    /// Latest home value.
    pub home_value: Option<f64>,
    /// Year-over-year price growth.
    pub price_yoy: Option<f64>,
    /// 3-year price CAGR used for scoring.
    pub price_3y_cagr: Option<f64>,
    /// Population growth.
    pub population_growth: Option<f64>,
    /// Gross rental yield.
    pub rental_yield: Option<f64>,
    /// `observed` or `estimated`; empty when no yield was available.
    pub yield_confidence: Option<YieldConfidence>,
    /// Year-over-year rent growth.
    pub rent_yoy: Option<f64>,
    /// Normalized affordability score.
    pub affordability_score: f64,
    /// Normalized growth score.
    pub growth_score: f64,
    /// Normalized demographic score.
    pub demographic_score: f64,
    /// Normalized income score.
    pub income_score: f64,
    /// Weighted composite.
    pub composite_score: f64,
    /// Composite on the display scale.
    pub display_score: f64,
    /// Zero-filled components, separated by [`LIST_SEPARATOR`].
    pub imputed_components: String,
    /// Whether any input was interpolated, filled or assumed.
    pub estimated: bool,
    /// Whether the entity has the full history window.
    pub full_history: bool,
    /// Provenance of the home value.
    pub home_value_coverage: Coverage,
    /// Provenance of the rent.
    pub rent_coverage: Coverage,
    /// Provenance of the population.
    pub population_coverage: Coverage,
}

impl RankingRow {
    /// Flatten one score result.
    pub fn new(methodology: &str, result: &ScoreResult, name: String) -> Self {
        let imputed_components = Component::ALL
            .iter()
            .filter(|c| result.is_imputed(**c))
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR);
        Self {
            methodology: methodology.to_string(),
            rank: result.rank,
            geo_level: result.entity.level().to_string(),
            geo_code: result.entity.code().to_string(),
            name,
            date: result.date,
            home_value: result.raw.price,
            price_yoy: result.raw.price_yoy,
            price_3y_cagr: result.raw.price_3y_cagr,
            population_growth: result.raw.population_growth,
            rental_yield: result.raw.rental_yield.map(|y| y.value),
            yield_confidence: result.yield_confidence(),
            rent_yoy: result.raw.rent_yoy,
            affordability_score: result.component(Component::Affordability),
            growth_score: result.component(Component::Growth),
            demographic_score: result.component(Component::Demographic),
            income_score: result.component(Component::Income),
            composite_score: result.composite,
            display_score: result.display_score,
            imputed_components,
            estimated: result.estimated,
            full_history: result.full_history,
            home_value_coverage: result.coverage[Measure::HomeValue.index()],
            rent_coverage: result.coverage[Measure::Rent.index()],
            population_coverage: result.coverage[Measure::Population.index()],
        }
    }
}

/// Rows of one score table, in rank order. Names come from `resolver` when given.
pub fn ranking_rows(table: &ScoreTable, resolver: Option<&GeoKeyResolver>) -> Vec<RankingRow> {
    table
        .results()
        .iter()
        .map(|result| RankingRow::new(table.name(), result, display_name(&result.entity, resolver)))
        .collect()
}

/// One master-table row: every measure for one entity and month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRow {
    /// `county`, `metro` or `national`.
    pub geo_level: String,
    /// FIPS or CBSA code.
    pub geo_code: String,
    /// Month.
    pub date: NaiveDate,
    /// Values in [`Measure::ALL`] order.
    pub values: [Option<f64>; Measure::COUNT],
    /// Provenance in [`Measure::ALL`] order.
    pub coverage: [Coverage; Measure::COUNT],
}

impl From<&MasterRecord> for MasterRow {
    fn from(record: &MasterRecord) -> Self {
        Self {
            geo_level: record.entity.level().to_string(),
            geo_code: record.entity.code().to_string(),
            date: record.date,
            values: record.values,
            coverage: record.coverage,
        }
    }
}

impl MasterRow {
    /// Column names: keys, then each measure followed by its coverage column.
    pub fn header() -> Vec<String> {
        let mut header = vec![
            "geo_level".to_string(),
            "geo_code".to_string(),
            "date".to_string(),
        ];
        for measure in Measure::ALL {
            header.push(measure.column().to_string());
            header.push(coverage_column(measure));
        }
        header
    }

    /// Cells in [`Self::header`] order; nulls are empty.
    pub fn record(&self) -> Vec<String> {
        let mut record = vec![
            self.geo_level.clone(),
            self.geo_code.clone(),
            self.date.to_string(),
        ];
        for measure in Measure::ALL {
            let i = measure.index();
            record.push(self.values[i].map(|v| v.to_string()).unwrap_or_default());
            record.push(self.coverage[i].label().to_string());
        }
        record
    }

    /// The row as a JSON object keyed by [`Self::header`].
    pub fn to_json_object(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut object = serde_json::Map::new();
        object.insert("geo_level".into(), self.geo_level.clone().into());
        object.insert("geo_code".into(), self.geo_code.clone().into());
        object.insert("date".into(), self.date.to_string().into());
        for measure in Measure::ALL {
            let i = measure.index();
            object.insert(measure.column().into(), self.values[i].into());
            object.insert(coverage_column(measure), self.coverage[i].label().into());
        }
        object
    }
}

/// Name of the coverage column of a measure.
pub fn coverage_column(measure: Measure) -> String {
    format!("{}_coverage", measure.column())
}

/// Every master-table row.
pub fn master_rows(table: &MasterTable) -> Vec<MasterRow> {
    table.records().iter().map(MasterRow::from).collect()
}
