//! Column access helpers for raw extracts.
//!
//! Source extracts arrive with inconsistent dtypes (codes as integers in one file
//! and strings in the next), so every read goes through a cast.

use crate::error::{DataError, Result};
use polars::prelude::*;

/// Fail with [`DataError::MissingColumn`] unless every column is present.
pub fn require_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    let present: Vec<&str> = df.get_column_names().iter().map(|c| c.as_str()).collect();
    match names.iter().find(|name| !present.contains(name)) {
        Some(missing) => Err(DataError::MissingColumn((*missing).to_string())),
        None => Ok(()),
    }
}

/// Whether the frame has a column with this name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Column values as trimmed strings; blanks become `None`.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    require_columns(df, &[name])?;
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|v| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string))
        .collect())
}

/// Column values as floats; unparseable and non-finite cells become `None`.
pub fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    require_columns(df, &[name])?;
    let column = df.column(name)?;
    let values: Vec<Option<f64>> = if column.dtype() == &DataType::String {
        column
            .str()?
            .into_iter()
            .map(|v| v.and_then(|s| s.trim().replace(',', "").parse::<f64>().ok()))
            .collect()
    } else {
        let cast = column.cast(&DataType::Float64)?;
        cast.f64()?.into_iter().collect()
    };
    Ok(values
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_values_casts_integers() {
        let df = df!("STATE" => [6i64, 36], "NAME" => ["Los Angeles", " "]).unwrap();
        assert_eq!(
            string_values(&df, "STATE").unwrap(),
            vec![Some("6".to_string()), Some("36".to_string())]
        );
        assert_eq!(
            string_values(&df, "NAME").unwrap(),
            vec![Some("Los Angeles".to_string()), None]
        );
    }

    #[test]
    fn test_float_values_parses_strings() {
        let df = df!("value" => ["1,234.5", "", "n/a"]).unwrap();
        assert_eq!(float_values(&df, "value").unwrap(), vec![Some(1234.5), None, None]);
    }

    #[test]
    fn test_missing_column() {
        let df = df!("a" => [1.0]).unwrap();
        assert!(matches!(
            require_columns(&df, &["a", "b"]),
            Err(DataError::MissingColumn(c)) if c == "b"
        ));
        assert!(has_column(&df, "a"));
    }
}
