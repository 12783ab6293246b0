//! County/metro/name crosswalk.

use crate::codes::{CbsaCode, Fips};
use crate::entity::{EntityKey, GeographicEntity};
use crate::error::{GeoError, Result};
use crate::names::{DIVISION_ALIASES, METRO_NAMES};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One county row of a county-to-CBSA crosswalk, before validation.
///
/// Codes are kept as raw strings because crosswalk files routinely drop leading
/// zeros; they are zero-padded when the resolver is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosswalkRow {
    /// State FIPS (1-2 digits).
    pub state_fips: String,
    /// County FIPS within the state (1-3 digits).
    pub county_fips: String,
    /// CBSA code the county belongs to.
    pub cbsa_code: String,
    /// County display name.
    pub county_name: Option<String>,
    /// CBSA title, e.g. "Los Angeles-Long Beach-Anaheim, CA".
    pub cbsa_title: Option<String>,
    /// Whether the county is a central (as opposed to outlying) county of the CBSA.
    pub central: Option<bool>,
}

/// Summary of rows rejected while building a resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrosswalkReport {
    /// Rows accepted as a county's primary CBSA.
    pub accepted: usize,
    /// Rows with malformed codes.
    pub invalid: usize,
    /// Additional rows for a county that already has a primary CBSA.
    pub secondary: usize,
}

/// Resolves geographic identifiers across providers.
///
/// Built once per run and shared by reference; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct GeoKeyResolver {
    counties: BTreeMap<Fips, GeographicEntity>,
    metro_counties: BTreeMap<CbsaCode, Vec<Fips>>,
    metro_titles: HashMap<CbsaCode, String>,
    names: HashMap<String, CbsaCode>,
    divisions: HashMap<String, CbsaCode>,
    report: CrosswalkReport,
}

impl GeoKeyResolver {
    /// Build the resolver from crosswalk rows plus the built-in name tables.
    ///
    /// A county appearing more than once keeps a single primary CBSA: a row marked
    /// central wins over an outlying one, otherwise the first row wins.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::CrosswalkMissing`] if no row is usable, since every
    /// downstream join depends on the crosswalk.
    pub fn from_crosswalk(rows: impl IntoIterator<Item = CrosswalkRow>) -> Result<Self> {
        let mut report = CrosswalkReport::default();
        let mut counties: BTreeMap<Fips, (GeographicEntity, bool)> = BTreeMap::new();
        let mut metro_titles = HashMap::new();

        for row in rows {
            let (fips, cbsa) = match (
                Fips::from_parts(&row.state_fips, &row.county_fips),
                CbsaCode::parse(&row.cbsa_code),
            ) {
                (Ok(fips), Ok(cbsa)) => (fips, cbsa),
                _ => {
                    report.invalid += 1;
                    continue;
                }
            };

            if let Some(title) = row.cbsa_title.as_deref().map(str::trim) {
                if !title.is_empty() {
                    metro_titles
                        .entry(cbsa.clone())
                        .or_insert_with(|| title.to_string());
                }
            }

            let central = row.central.unwrap_or(false);
            let name = row.county_name.unwrap_or_else(|| fips.to_string());
            match counties.get_mut(&fips) {
                Some((existing, existing_central)) => {
                    report.secondary += 1;
                    if central && !*existing_central {
                        existing.cbsa_code = Some(cbsa);
                        *existing_central = true;
                    }
                }
                None => {
                    report.accepted += 1;
                    let entity = GeographicEntity::new(fips.clone(), Some(cbsa), name);
                    counties.insert(fips, (entity, central));
                }
            }
        }

        if counties.is_empty() {
            return Err(GeoError::CrosswalkMissing);
        }

        let counties: BTreeMap<Fips, GeographicEntity> = counties
            .into_iter()
            .map(|(fips, (entity, _))| (fips, entity))
            .collect();

        let mut metro_counties: BTreeMap<CbsaCode, Vec<Fips>> = BTreeMap::new();
        for entity in counties.values() {
            if let Some(cbsa) = &entity.cbsa_code {
                metro_counties
                    .entry(cbsa.clone())
                    .or_default()
                    .push(entity.fips.clone());
            }
        }

        let mut names = HashMap::new();
        for (name, code) in METRO_NAMES {
            if let Ok(cbsa) = CbsaCode::parse(code) {
                names.insert((*name).to_string(), cbsa);
            }
        }
        for (cbsa, title) in &metro_titles {
            names.entry(title.clone()).or_insert_with(|| cbsa.clone());
        }

        let divisions = DIVISION_ALIASES
            .iter()
            .filter_map(|(division, code)| {
                CbsaCode::parse(code)
                    .ok()
                    .map(|cbsa| ((*division).to_string(), cbsa))
            })
            .collect();

        Ok(Self {
            counties,
            metro_counties,
            metro_titles,
            names,
            divisions,
            report,
        })
    }

    /// Add or override display-name aliases.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidCbsa`] if any alias code is malformed.
    pub fn with_name_aliases<N, C>(mut self, aliases: impl IntoIterator<Item = (N, C)>) -> Result<Self>
    where
        N: Into<String>,
        C: AsRef<str>,
    {
        for (name, code) in aliases {
            let cbsa = CbsaCode::parse(code.as_ref())?;
            self.names.insert(name.into(), cbsa);
        }
        Ok(self)
    }

    /// Primary CBSA of a county, if it belongs to one.
    pub fn resolve_county_to_cbsa(&self, fips: &Fips) -> Option<&CbsaCode> {
        self.counties.get(fips).and_then(|e| e.cbsa_code.as_ref())
    }

    /// CBSA for a provider display name (exact match after trimming).
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Unmapped`] when the name is not in the lookup table;
    /// callers drop the row rather than abort.
    pub fn resolve_name_to_cbsa(&self, display_name: &str) -> Result<CbsaCode> {
        self.names
            .get(display_name.trim())
            .cloned()
            .ok_or_else(|| GeoError::Unmapped {
                kind: "metro name",
                key: display_name.to_string(),
            })
    }

    /// CBSA for a code that may be a metropolitan-division id.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidCbsa`] if the code is not a CBSA-shaped code.
    pub fn resolve_division(&self, code: &str) -> Result<CbsaCode> {
        let cbsa = CbsaCode::parse(code)?;
        Ok(self
            .divisions
            .get(cbsa.as_str())
            .cloned()
            .unwrap_or(cbsa))
    }

    /// Counties whose primary CBSA is `cbsa`.
    pub fn counties_in(&self, cbsa: &CbsaCode) -> &[Fips] {
        self.metro_counties
            .get(cbsa)
            .map_or(&[], Vec::as_slice)
    }

    /// Whether the crosswalk knows this CBSA.
    pub fn contains_metro(&self, cbsa: &CbsaCode) -> bool {
        self.metro_counties.contains_key(cbsa)
    }

    /// Crosswalk entry for a county.
    pub fn entity(&self, fips: &Fips) -> Option<&GeographicEntity> {
        self.counties.get(fips)
    }

    /// Iterate over all counties in FIPS order.
    pub fn entities(&self) -> impl Iterator<Item = &GeographicEntity> {
        self.counties.values()
    }

    /// CBSA title from the crosswalk.
    pub fn metro_title(&self, cbsa: &CbsaCode) -> Option<&str> {
        self.metro_titles.get(cbsa).map(String::as_str)
    }

    /// Human-readable name for an entity key, if known.
    pub fn display_name(&self, key: &EntityKey) -> Option<String> {
        match key {
            EntityKey::County(fips) => self.entity(fips).map(|e| e.name.clone()),
            EntityKey::Metro(cbsa) => self.metro_title(cbsa).map(str::to_string),
            EntityKey::National => Some("United States".to_string()),
        }
    }

    /// Number of counties in the crosswalk.
    pub fn county_count(&self) -> usize {
        self.counties.len()
    }

    /// Number of distinct CBSAs in the crosswalk.
    pub fn metro_count(&self) -> usize {
        self.metro_counties.len()
    }

    /// Row counts from building the crosswalk.
    pub const fn report(&self) -> &CrosswalkReport {
        &self.report
    }
}
