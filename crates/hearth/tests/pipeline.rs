//! End-to-end runs over small synthetic extracts.

use approx::assert_abs_diff_eq;
use chrono::{Months, NaiveDate};
use hearth::data::{Coverage, DataError, Measure};
use hearth::metrics::snapshot::{POPULATION_GROWTH, PRICE_3Y_CAGR, PRICE_YOY};
use hearth::output::{ExportFormat, Exporter};
use hearth::score::{Component, Methodology, ScoreError, ScoringWeights, YieldConfidence};
use hearth::{
    Pipeline, PipelineConfig, PipelineError, PipelineInputs, SourceKind, SourceTable,
    data::sources::ZillowGeography,
};
use polars::prelude::*;

/// Austin is cheapest and fastest growing, Phoenix the opposite.
const METROS: [(&str, &str, f64, f64, f64, f64); 3] = [
    // (zillow name, cbsa, price, price growth, rent, rent growth)
    ("Austin, TX", "12420", 300_000.0, 0.08, 2_200.0, 0.06),
    ("Denver, CO", "19740", 400_000.0, 0.05, 2_200.0, 0.04),
    ("Phoenix, AZ", "38060", 600_000.0, 0.02, 2_400.0, 0.01),
];

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
}

fn crosswalk() -> DataFrame {
    df!(
        "cbsacode" => [12420i64, 19740, 38060],
        "fipsstatecode" => [48i64, 8, 4],
        "fipscountycode" => [453i64, 31, 13],
        "countycountyequivalent" => ["Travis County", "Denver County", "Maricopa County"],
        "cbsatitle" => [
            "Austin-Round Rock-San Marcos, TX",
            "Denver-Aurora-Centennial, CO",
            "Phoenix-Mesa-Chandler, AZ",
        ],
    )
    .unwrap()
}

/// Zillow wide table with month-end headers ending at the processing month and
/// values growing linearly at `rate` per year.
fn zillow(months: u32, rows: &[(&str, f64, f64)]) -> DataFrame {
    let first = as_of().checked_sub_months(Months::new(months - 1)).unwrap();
    let names: Vec<&str> = rows.iter().map(|(name, _, _)| *name).collect();
    let mut columns: Vec<Column> = vec![Series::new("RegionName".into(), names).into()];
    for m in 0..months {
        let month_end = first
            .checked_add_months(Months::new(m + 1))
            .and_then(|d| d.pred_opt())
            .unwrap();
        let values: Vec<f64> = rows
            .iter()
            .map(|(_, base, rate)| base * (1.0 + rate * f64::from(m) / 12.0))
            .collect();
        let header = month_end.format("%Y-%m-%d").to_string();
        columns.push(Series::new(header.as_str().into(), values).into());
    }
    DataFrame::new(columns).unwrap()
}

fn home_values(months: u32) -> SourceTable {
    let rows: Vec<_> = METROS.iter().map(|m| (m.0, m.2, m.3)).collect();
    SourceTable::new(
        SourceKind::Zillow {
            measure: Measure::HomeValue,
            geography: ZillowGeography::Metro,
        },
        zillow(months, &rows),
    )
}

fn rents(months: u32) -> SourceTable {
    let rows: Vec<_> = METROS.iter().map(|m| (m.0, m.4, m.5)).collect();
    SourceTable::new(
        SourceKind::Zillow {
            measure: Measure::Rent,
            geography: ZillowGeography::Metro,
        },
        zillow(months, &rows),
    )
}

fn population() -> SourceTable {
    SourceTable::new(
        SourceKind::CensusPopulation,
        df!(
            "STATE" => [48i64, 8, 4, 48],
            "COUNTY" => [453i64, 31, 13, 0],
            "POPESTIMATE2022" => [1_000_000.0, 700_000.0, 4_400_000.0, 30_000_000.0],
            "POPESTIMATE2023" => [1_030_000.0, 710_500.0, 4_400_000.0, 30_500_000.0],
            "POPESTIMATE2024" => [1_061_000.0, 721_000.0, 4_400_000.0, 31_000_000.0],
        )
        .unwrap(),
    )
}

/// Estimates that stop two years before the price data does.
fn lagging_population() -> SourceTable {
    SourceTable::new(
        SourceKind::CensusPopulation,
        df!(
            "STATE" => [48i64, 8, 4],
            "COUNTY" => [453i64, 31, 13],
            "POPESTIMATE2021" => [1_000_000.0, 700_000.0, 4_400_000.0],
            "POPESTIMATE2022" => [1_030_000.0, 710_500.0, 4_400_000.0],
            "POPESTIMATE2023" => [1_060_900.0, 721_157.5, 4_400_000.0],
        )
        .unwrap(),
    )
}

fn config() -> PipelineConfig {
    PipelineConfig::default().with_as_of(as_of())
}

fn run(sources: Vec<SourceTable>) -> hearth::Result<hearth::PipelineOutput> {
    Pipeline::new(config())?.run(&PipelineInputs::new(crosswalk(), sources))
}

#[test]
fn test_end_to_end_rankings() {
    let output = run(vec![home_values(37), rents(37), population()]).unwrap();

    assert_eq!(output.snapshots.len(), 3);
    assert_eq!(output.snapshot_report.short_history, 0);
    assert_eq!(output.rankings.len(), 3);
    assert_eq!(output.comparisons.len(), 2);
    assert_eq!(output.drops[2].report.dropped["state total"], 1);

    for table in &output.rankings {
        let order: Vec<_> = table
            .results()
            .iter()
            .map(|r| (r.entity.code(), r.rank))
            .collect();
        assert_eq!(
            order,
            [("12420", 1), ("19740", 2), ("38060", 3)],
            "{}",
            table.name()
        );
    }

    let balanced = output.ranking("balanced").unwrap();
    assert_abs_diff_eq!(balanced.results()[0].composite, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(balanced.results()[2].composite, 0.0, epsilon = 1e-9);
    for result in balanced.results() {
        assert!(result.full_history);
        assert_eq!(result.yield_confidence(), Some(YieldConfidence::Observed));
        assert!(result.imputed.iter().all(|i| !i));
    }

    for comparison in &output.comparisons {
        assert_eq!(comparison.max_rank_change(), 0);
        assert_abs_diff_eq!(comparison.spearman, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_growth_metrics_follow_prices() {
    let output = run(vec![home_values(37), rents(37), population()]).unwrap();
    let austin = &output.snapshots[0];
    assert_eq!(austin.entity.code(), "12420");
    assert_eq!(austin.date, as_of());
    // 36 months at 8% a year: 1.24 / 1.16 over the last twelve.
    assert_abs_diff_eq!(
        austin.metric(PRICE_YOY).unwrap(),
        1.24 / 1.16 - 1.0,
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(
        austin.metric(PRICE_3Y_CAGR).unwrap(),
        1.24f64.powf(1.0 / 3.0) - 1.0,
        epsilon = 1e-9
    );
    assert_eq!(austin.coverage_of(Measure::HomeValue), Coverage::Observed);
    assert!(austin.value(Measure::Population).is_some());
}

#[test]
fn test_lagging_population_still_separates_entities() {
    let output = run(vec![home_values(37), rents(37), lagging_population()]).unwrap();

    let growth: Vec<f64> = output
        .snapshots
        .iter()
        .map(|s| s.metric(POPULATION_GROWTH).unwrap())
        .collect();
    assert_abs_diff_eq!(growth[0], 0.03, epsilon = 1e-9);
    assert_abs_diff_eq!(growth[1], 0.015, epsilon = 1e-9);
    assert_abs_diff_eq!(growth[2], 0.0, epsilon = 1e-12);

    let balanced = output.ranking("balanced").unwrap();
    let demographic: Vec<f64> = balanced
        .results()
        .iter()
        .map(|r| r.component(Component::Demographic))
        .collect();
    assert_abs_diff_eq!(demographic[0], 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(demographic[2], 0.0, epsilon = 1e-9);
}

#[test]
fn test_missing_rent_keeps_entities() {
    let output = run(vec![home_values(37), population()]).unwrap();

    assert_eq!(output.snapshots.len(), 3);
    assert!(output.snapshots.iter().all(|s| s.metric("rental_yield").is_none()));
    let balanced = output.ranking("balanced").unwrap();
    assert_eq!(balanced.len(), 3);
    for result in balanced.results() {
        assert_eq!(result.yield_confidence(), Some(YieldConfidence::Estimated));
        assert!(result.estimated);
    }
}

#[test]
fn test_short_history_nulls_cagr() {
    let output = run(vec![home_values(20), rents(20), population()]).unwrap();

    assert_eq!(output.snapshots.len(), 3);
    assert_eq!(output.snapshot_report.short_history, 3);
    for snapshot in &output.snapshots {
        assert!(!snapshot.full_history);
        assert!(snapshot.metric(PRICE_3Y_CAGR).is_none());
        assert!(snapshot.metric(PRICE_YOY).is_some());
        assert!(!snapshot.issues.is_empty());
    }
}

#[test]
fn test_missing_home_values_is_fatal() {
    let err = run(vec![rents(37), population()]).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Data(DataError::MissingSource(Measure::HomeValue))
    ));
}

#[test]
fn test_invalid_weights_rejected() {
    let weights = ScoringWeights {
        affordability: 0.5,
        growth: 0.5,
        demographic: 0.2,
        income: 0.1,
    };
    let config =
        config().with_methodologies(vec![Methodology::balanced().with_weights(weights)]);
    let err = Pipeline::new(config).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Score(ScoreError::InvalidWeights { .. })
    ));
}

#[test]
fn test_outputs() {
    let output = run(vec![home_values(37), rents(37), population()]).unwrap();

    let rows = output.ranking_rows();
    assert_eq!(rows.len(), 9);
    assert_eq!(rows[0].name, "Austin-Round Rock-San Marcos, TX");
    let csv = rows.export_to_string(ExportFormat::Csv).unwrap();
    assert!(csv.starts_with("methodology,rank,geo_level,geo_code,name,date"));

    assert_eq!(output.master_rows().len(), 3 * 37);

    let markdown = output.report(2).unwrap().to_markdown();
    assert!(markdown.contains("# Housing Market Rankings"));
    assert!(markdown.contains("## balanced"));
    assert!(markdown.contains("## Methodology Agreement"));
}
