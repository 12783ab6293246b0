//! Geographic entities and the keys that identify them in a series.

use crate::codes::{CbsaCode, Fips};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Granularity of a geographic key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoLevel {
    /// A single county, keyed by FIPS.
    County,
    /// A metro/micro area, keyed by CBSA code.
    Metro,
    /// The whole country; a single series with no geography.
    National,
}

impl GeoLevel {
    /// Lowercase label used in output tables.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::County => "county",
            Self::Metro => "metro",
            Self::National => "national",
        }
    }
}

impl fmt::Display for GeoLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Key identifying which entity an observation belongs to.
///
/// Ordering sorts counties before metros before the national series, then by code,
/// which is the canonical row order of every table in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "level", content = "code", rename_all = "snake_case")]
pub enum EntityKey {
    /// County-level observation.
    County(Fips),
    /// Metro-level observation.
    Metro(CbsaCode),
    /// National observation, broadcast to every entity on merge.
    National,
}

impl EntityKey {
    /// Level of this key.
    pub const fn level(&self) -> GeoLevel {
        match self {
            Self::County(_) => GeoLevel::County,
            Self::Metro(_) => GeoLevel::Metro,
            Self::National => GeoLevel::National,
        }
    }

    /// The bare code (`"06037"`, `"31080"`, or `"US"`).
    pub fn code(&self) -> &str {
        match self {
            Self::County(fips) => fips.as_str(),
            Self::Metro(cbsa) => cbsa.as_str(),
            Self::National => "US",
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.level(), self.code())
    }
}

impl From<Fips> for EntityKey {
    fn from(fips: Fips) -> Self {
        Self::County(fips)
    }
}

impl From<CbsaCode> for EntityKey {
    fn from(cbsa: CbsaCode) -> Self {
        Self::Metro(cbsa)
    }
}

/// A county as described by the crosswalk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographicEntity {
    /// Five-digit county FIPS.
    pub fips: Fips,
    /// Primary CBSA the county belongs to, if any.
    pub cbsa_code: Option<CbsaCode>,
    /// County display name.
    pub name: String,
    /// Two-digit state FIPS code.
    pub state: String,
}

impl GeographicEntity {
    /// Create a county entity; the state code is taken from the FIPS prefix.
    pub fn new(fips: Fips, cbsa_code: Option<CbsaCode>, name: impl Into<String>) -> Self {
        let state = fips.state().to_string();
        Self {
            fips,
            cbsa_code,
            name: name.into(),
            state,
        }
    }

    /// Key of this county in a series.
    pub fn key(&self) -> EntityKey {
        EntityKey::County(self.fips.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_key_ordering() {
        let county = EntityKey::County(Fips::parse("06037").unwrap());
        let metro = EntityKey::Metro(CbsaCode::parse("31080").unwrap());
        assert!(county < metro);
        assert!(metro < EntityKey::National);
    }

    #[test]
    fn test_entity_key_display() {
        let county = EntityKey::County(Fips::parse("6037").unwrap());
        assert_eq!(county.to_string(), "county:06037");
        assert_eq!(EntityKey::National.code(), "US");
    }

    #[test]
    fn test_entity_state_matches_fips() {
        let entity = GeographicEntity::new(Fips::parse("48201").unwrap(), None, "Harris County");
        assert_eq!(entity.state, "48");
        assert_eq!(entity.key().level(), GeoLevel::County);
    }
}
