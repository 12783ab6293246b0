//! Census county-to-CBSA delineation file (NBER `cbsa2fipsxw` layout).

use crate::error::Result;
use crate::frame::{has_column, require_columns, string_values};
use hearth_geo::{CrosswalkRow, GeoKeyResolver};
use polars::prelude::*;
use tracing::info;

/// CBSA code column.
pub const CBSA_CODE: &str = "cbsacode";
/// State FIPS column.
pub const STATE_FIPS: &str = "fipsstatecode";
/// County FIPS column.
pub const COUNTY_FIPS: &str = "fipscountycode";
/// County name column.
pub const COUNTY_NAME: &str = "countycountyequivalent";
/// CBSA title column.
pub const CBSA_TITLE: &str = "cbsatitle";
/// `Central` / `Outlying` column.
pub const CENTRAL_OUTLYING: &str = "centraloutlyingcounty";

/// Read crosswalk rows from the delineation table.
pub fn crosswalk_rows(df: &DataFrame) -> Result<Vec<CrosswalkRow>> {
    require_columns(df, &[CBSA_CODE, STATE_FIPS, COUNTY_FIPS])?;
    let optional = |name: &str| -> Result<Vec<Option<String>>> {
        if has_column(df, name) {
            string_values(df, name)
        } else {
            Ok(vec![None; df.height()])
        }
    };
    let cbsa = string_values(df, CBSA_CODE)?;
    let state = string_values(df, STATE_FIPS)?;
    let county = string_values(df, COUNTY_FIPS)?;
    let names = optional(COUNTY_NAME)?;
    let titles = optional(CBSA_TITLE)?;
    let central = optional(CENTRAL_OUTLYING)?;

    Ok((0..df.height())
        .map(|i| CrosswalkRow {
            state_fips: state[i].clone().unwrap_or_default(),
            county_fips: county[i].clone().unwrap_or_default(),
            cbsa_code: cbsa[i].clone().unwrap_or_default(),
            county_name: names[i].clone(),
            cbsa_title: titles[i].clone(),
            central: central[i]
                .as_deref()
                .map(|c| c.eq_ignore_ascii_case("central")),
        })
        .collect())
}

/// Build the resolver from the delineation table.
///
/// # Errors
///
/// Fails when required columns are absent or no row is usable.
pub fn load_resolver(df: &DataFrame) -> Result<GeoKeyResolver> {
    let resolver = GeoKeyResolver::from_crosswalk(crosswalk_rows(df)?)?;
    let report = resolver.report();
    info!(
        counties = resolver.county_count(),
        metros = resolver.metro_count(),
        invalid = report.invalid,
        secondary = report.secondary,
        "loaded county-to-cbsa crosswalk"
    );
    Ok(resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use hearth_geo::{CbsaCode, Fips, GeoError};

    #[test]
    fn test_load_resolver() {
        let df = df!(
            "cbsacode" => [31080i64, 31080, 12420],
            "cbsatitle" => ["Los Angeles-Long Beach-Anaheim, CA", "Los Angeles-Long Beach-Anaheim, CA", "Austin-Round Rock-San Marcos, TX"],
            "countycountyequivalent" => ["Los Angeles County", "Orange County", "Travis County"],
            "fipsstatecode" => [6i64, 6, 48],
            "fipscountycode" => [37i64, 59, 453],
            "centraloutlyingcounty" => ["Central", "Central", "Central"],
        )
        .unwrap();
        let resolver = load_resolver(&df).unwrap();
        assert_eq!(resolver.county_count(), 3);
        assert_eq!(resolver.metro_count(), 2);
        assert_eq!(
            resolver.resolve_county_to_cbsa(&Fips::parse("06059").unwrap()),
            Some(&CbsaCode::parse("31080").unwrap())
        );
        assert_eq!(
            resolver
                .resolve_name_to_cbsa("Austin-Round Rock-San Marcos, TX")
                .unwrap()
                .as_str(),
            "12420"
        );
    }

    #[test]
    fn test_empty_crosswalk_is_fatal() {
        let df = df!(
            "cbsacode" => Vec::<i64>::new(),
            "fipsstatecode" => Vec::<i64>::new(),
            "fipscountycode" => Vec::<i64>::new(),
        )
        .unwrap();
        let err = load_resolver(&df).unwrap_err();
        assert!(matches!(err, DataError::Geo(GeoError::CrosswalkMissing)));
        assert!(err.is_fatal());
    }
}
