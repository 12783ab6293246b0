//! Validated geographic codes.
//!
//! Source files store FIPS and CBSA codes inconsistently: as integers that lost their
//! leading zeros, as floats (`6037.0`), or as zero-padded strings. Every constructor
//! here normalizes to the canonical zero-padded form.

use crate::error::{GeoError, Result};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Width of a state FIPS code.
pub const STATE_FIPS_WIDTH: usize = 2;

/// Width of the county part of a FIPS code.
pub const COUNTY_FIPS_WIDTH: usize = 3;

/// Width of a full county FIPS code and of a CBSA code.
pub const FIPS_WIDTH: usize = STATE_FIPS_WIDTH + COUNTY_FIPS_WIDTH;

/// Zero-pad a numeric code to `width` digits.
///
/// Accepts surrounding whitespace and a trailing `.0` left behind by float-typed
/// columns. Returns `None` for anything that is not purely digits or is wider than
/// `width` once cleaned.
pub fn zero_pad(raw: &str, width: usize) -> Option<String> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    if digits.is_empty() || digits.len() > width || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{digits:0>width$}"))
}

/// Five-digit county FIPS code (2-digit state + 3-digit county).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Fips(String);

impl Fips {
    /// Parse a full county FIPS code, zero-padding it to five digits.
    pub fn parse(raw: &str) -> Result<Self> {
        zero_pad(raw, FIPS_WIDTH)
            .map(Self)
            .ok_or_else(|| GeoError::InvalidFips(raw.to_string()))
    }

    /// Build a FIPS code from separate state and county parts.
    pub fn from_parts(state: &str, county: &str) -> Result<Self> {
        let invalid = || GeoError::InvalidFips(format!("{state}/{county}"));
        let state = zero_pad(state, STATE_FIPS_WIDTH).ok_or_else(invalid)?;
        let county = zero_pad(county, COUNTY_FIPS_WIDTH).ok_or_else(invalid)?;
        Ok(Self(format!("{state}{county}")))
    }

    /// The two-digit state prefix.
    pub fn state(&self) -> &str {
        &self.0[..STATE_FIPS_WIDTH]
    }

    /// The three-digit county suffix.
    pub fn county(&self) -> &str {
        &self.0[STATE_FIPS_WIDTH..]
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Five-digit Core Based Statistical Area (metro/micro area) code.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CbsaCode(String);

impl CbsaCode {
    /// Parse a CBSA code, zero-padding it to five digits.
    pub fn parse(raw: &str) -> Result<Self> {
        zero_pad(raw, FIPS_WIDTH)
            .map(Self)
            .ok_or_else(|| GeoError::InvalidCbsa(raw.to_string()))
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
