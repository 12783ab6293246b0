//! Polars views of the output tables.

use crate::error::Result;
use crate::rows::{MasterRow, RankingRow, coverage_column};
use chrono::NaiveDate;
use hearth_data::Measure;
use polars::prelude::*;

fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::default();
    i32::try_from((date - epoch).num_days()).unwrap_or(i32::MAX)
}

fn with_date_column(df: DataFrame) -> Result<DataFrame> {
    Ok(df
        .lazy()
        .with_column(col("date").cast(DataType::Date))
        .collect()?)
}

fn labels<T: ToString>(values: impl Iterator<Item = T>) -> Vec<String> {
    values.map(|v| v.to_string()).collect()
}

/// Ranking rows as a `DataFrame` with the export column names and a `Date`
/// column.
pub fn ranking_frame(rows: &[RankingRow]) -> Result<DataFrame> {
    let f64s = |f: fn(&RankingRow) -> f64| rows.iter().map(f).collect::<Vec<_>>();
    let opts = |f: fn(&RankingRow) -> Option<f64>| rows.iter().map(f).collect::<Vec<_>>();

    let df = DataFrame::new(vec![
        Series::new("methodology".into(), labels(rows.iter().map(|r| &r.methodology))).into(),
        Series::new(
            "rank".into(),
            rows.iter().map(|r| r.rank as u32).collect::<Vec<_>>(),
        )
        .into(),
        Series::new("geo_level".into(), labels(rows.iter().map(|r| &r.geo_level))).into(),
        Series::new("geo_code".into(), labels(rows.iter().map(|r| &r.geo_code))).into(),
        Series::new("name".into(), labels(rows.iter().map(|r| &r.name))).into(),
        Series::new(
            "date".into(),
            rows.iter().map(|r| days_since_epoch(r.date)).collect::<Vec<_>>(),
        )
        .into(),
        Series::new("home_value".into(), opts(|r| r.home_value)).into(),
        Series::new("price_yoy".into(), opts(|r| r.price_yoy)).into(),
        Series::new("price_3y_cagr".into(), opts(|r| r.price_3y_cagr)).into(),
        Series::new("population_growth".into(), opts(|r| r.population_growth)).into(),
        Series::new("rental_yield".into(), opts(|r| r.rental_yield)).into(),
        Series::new(
            "yield_confidence".into(),
            rows.iter()
                .map(|r| r.yield_confidence.map(|c| c.to_string()))
                .collect::<Vec<_>>(),
        )
        .into(),
        Series::new("rent_yoy".into(), opts(|r| r.rent_yoy)).into(),
        Series::new("affordability_score".into(), f64s(|r| r.affordability_score)).into(),
        Series::new("growth_score".into(), f64s(|r| r.growth_score)).into(),
        Series::new("demographic_score".into(), f64s(|r| r.demographic_score)).into(),
        Series::new("income_score".into(), f64s(|r| r.income_score)).into(),
        Series::new("composite_score".into(), f64s(|r| r.composite_score)).into(),
        Series::new("display_score".into(), f64s(|r| r.display_score)).into(),
        Series::new(
            "imputed_components".into(),
            labels(rows.iter().map(|r| &r.imputed_components)),
        )
        .into(),
        Series::new(
            "estimated".into(),
            rows.iter().map(|r| r.estimated).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "full_history".into(),
            rows.iter().map(|r| r.full_history).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "home_value_coverage".into(),
            labels(rows.iter().map(|r| r.home_value_coverage)),
        )
        .into(),
        Series::new(
            "rent_coverage".into(),
            labels(rows.iter().map(|r| r.rent_coverage)),
        )
        .into(),
        Series::new(
            "population_coverage".into(),
            labels(rows.iter().map(|r| r.population_coverage)),
        )
        .into(),
    ])?;
    with_date_column(df)
}

/// Master rows as a `DataFrame`: keys, then each measure and its coverage.
pub fn master_frame(rows: &[MasterRow]) -> Result<DataFrame> {
    let mut columns: Vec<Column> = vec![
        Series::new("geo_level".into(), labels(rows.iter().map(|r| &r.geo_level))).into(),
        Series::new("geo_code".into(), labels(rows.iter().map(|r| &r.geo_code))).into(),
        Series::new(
            "date".into(),
            rows.iter().map(|r| days_since_epoch(r.date)).collect::<Vec<_>>(),
        )
        .into(),
    ];
    for measure in Measure::ALL {
        let i = measure.index();
        columns.push(
            Series::new(
                measure.column().into(),
                rows.iter().map(|r| r.values[i]).collect::<Vec<_>>(),
            )
            .into(),
        );
        columns.push(
            Series::new(
                coverage_column(measure).into(),
                labels(rows.iter().map(|r| r.coverage[i])),
            )
            .into(),
        );
    }
    with_date_column(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::tests::result;
    use hearth_data::MasterRecord;
    use hearth_geo::{CbsaCode, EntityKey};

    #[test]
    fn test_ranking_frame() {
        let rows = vec![
            RankingRow::new("z_score", &result("12420", 1, 71.0), "Austin, TX".into()),
            RankingRow::new("z_score", &result("31080", 2, 40.0), "31080".into()),
        ];
        let df = ranking_frame(&rows).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
        assert_eq!(df.column("rank").unwrap().u32().unwrap().get(1), Some(2));
        assert_eq!(
            df.column("composite_score").unwrap().f64().unwrap().get(0),
            Some(71.0)
        );
        assert_eq!(df.column("population_growth").unwrap().null_count(), 2);
        assert_eq!(
            df.column("rent_coverage").unwrap().str().unwrap().get(0),
            Some("missing")
        );
    }

    #[test]
    fn test_master_frame() {
        let entity = EntityKey::Metro(CbsaCode::parse("12420").unwrap());
        let rows: Vec<MasterRow> = (1..=3)
            .map(|m| {
                let date = NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
                MasterRow::from(
                    &MasterRecord::new(entity.clone(), date)
                        .with(Measure::HomeValue, 400_000.0 + f64::from(m)),
                )
            })
            .collect();
        let df = master_frame(&rows).unwrap();
        assert_eq!(df.shape(), (3, 3 + 2 * Measure::COUNT));
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
        assert_eq!(df.column("rent").unwrap().null_count(), 3);
        assert_eq!(
            df.column("home_value").unwrap().f64().unwrap().get(2),
            Some(400_003.0)
        );
    }
}
