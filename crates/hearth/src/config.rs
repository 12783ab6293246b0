//! Run configuration.
//!
//! A [`PipelineConfig`] names the source extracts, the harmonization settings and
//! the methodologies to score. It deserializes from JSON; every section is
//! optional and falls back to its default.
//!
//! ```json
//! {
//!   "crosswalk": "cbsa2fipsxw.csv",
//!   "sources": [
//!     { "source": "zillow", "measure": "home_value", "path": "zhvi.csv" },
//!     { "source": "zillow", "measure": "rent", "path": "zori.csv" },
//!     { "source": "census_population", "path": "co-est.csv" }
//!   ],
//!   "merge": { "as_of": "2024-12-01" },
//!   "methodologies": [{ "name": "custom", "normalization": "z_score" }]
//! }
//! ```

use crate::error::{PipelineError, Result};
use hearth_data::sources::{
    BlsAdapter, CensusPopulationAdapter, FhfaAdapter, FreddieMacAdapter, ZillowAdapter,
    ZillowGeography,
};
use hearth_data::{
    DropReport, Frequency, Measure, MergeConfig, NormalizeConfig, ObservationSeries,
};
use hearth_geo::GeoKeyResolver;
use hearth_metrics::SnapshotConfig;
use hearth_output::DEFAULT_TOP_N;
use hearth_score::Methodology;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

const fn metro() -> ZillowGeography {
    ZillowGeography::Metro
}

const fn quarterly() -> Frequency {
    Frequency::Quarterly
}

/// Provider layout of one source extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SourceKind {
    /// Zillow wide table (home values, rents or inventory).
    Zillow {
        /// Measure the file carries.
        measure: Measure,
        /// Metro or county rows.
        #[serde(default = "metro")]
        geography: ZillowGeography,
    },
    /// BLS long table (employment or wages).
    Bls {
        /// Measure the file carries.
        measure: Measure,
    },
    /// Census county population estimates.
    CensusPopulation,
    /// FHFA house price index.
    Fhfa {
        /// Rows kept from the master file.
        #[serde(default = "quarterly")]
        frequency: Frequency,
    },
    /// Freddie Mac weekly mortgage rate.
    FreddieMac,
}

impl SourceKind {
    /// Measure the source produces.
    pub const fn measure(&self) -> Measure {
        match self {
            Self::Zillow { measure, .. } | Self::Bls { measure } => *measure,
            Self::CensusPopulation => Measure::Population,
            Self::Fhfa { .. } => Measure::Hpi,
            Self::FreddieMac => Measure::MortgageRate,
        }
    }

    /// Check the measure is one the provider publishes.
    pub fn validate(&self) -> Result<()> {
        let supported = match self {
            Self::Zillow { measure, .. } => matches!(
                measure,
                Measure::HomeValue | Measure::Rent | Measure::Inventory
            ),
            Self::Bls { measure } => matches!(measure, Measure::Employment | Measure::Wage),
            Self::Fhfa { frequency } => {
                matches!(frequency, Frequency::Monthly | Frequency::Quarterly)
            }
            Self::CensusPopulation | Self::FreddieMac => true,
        };
        if supported {
            Ok(())
        } else {
            Err(PipelineError::Config(format!("unsupported source: {self}")))
        }
    }

    /// Run the matching adapter over a raw extract.
    pub fn load(
        &self,
        df: &DataFrame,
        resolver: &GeoKeyResolver,
    ) -> hearth_data::Result<(ObservationSeries, DropReport)> {
        match *self {
            Self::Zillow { measure, geography } => {
                ZillowAdapter::new(measure, geography).load(df, resolver)
            }
            Self::Bls { measure } => BlsAdapter::new(measure).load(df, resolver),
            Self::CensusPopulation => CensusPopulationAdapter::new().load(df),
            Self::Fhfa { frequency } => FhfaAdapter::new(frequency).load(df, resolver),
            Self::FreddieMac => FreddieMacAdapter::new().load(df),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zillow { measure, geography } => {
                let level = match geography {
                    ZillowGeography::Metro => "metro",
                    ZillowGeography::County => "county",
                };
                write!(f, "zillow:{measure}:{level}")
            }
            Self::Bls { measure } => write!(f, "bls:{measure}"),
            Self::CensusPopulation => write!(f, "census:population"),
            Self::Fhfa { .. } => write!(f, "fhfa:hpi"),
            Self::FreddieMac => write!(f, "freddie_mac:mortgage_rate"),
        }
    }
}

/// One source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Provider layout.
    #[serde(flatten)]
    pub kind: SourceKind,
    /// CSV path, relative to the data directory unless absolute.
    pub path: PathBuf,
}

/// Configuration for a full run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// County-to-CBSA delineation file.
    pub crosswalk: Option<PathBuf>,
    /// Source extracts.
    pub sources: Vec<SourceFile>,
    /// Frequency alignment.
    pub normalize: NormalizeConfig,
    /// Join and gap filling.
    pub merge: MergeConfig,
    /// Metrics to compute; every registered metric when `None`.
    pub metrics: Option<Vec<String>>,
    /// Snapshot collapse.
    pub snapshot: SnapshotConfig,
    /// Methodologies to score, the first being the comparison base.
    pub methodologies: Vec<Methodology>,
    /// Entities listed per report section.
    pub top_n: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            crosswalk: None,
            sources: Vec::new(),
            normalize: NormalizeConfig::default(),
            merge: MergeConfig::default(),
            metrics: None,
            snapshot: SnapshotConfig::default(),
            methodologies: Methodology::presets(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON, and on a configuration [`Self::validate`] rejects.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add a source file.
    pub fn with_source(mut self, kind: SourceKind, path: impl Into<PathBuf>) -> Self {
        self.sources.push(SourceFile {
            kind,
            path: path.into(),
        });
        self
    }

    /// Replace the methodologies.
    pub fn with_methodologies(mut self, methodologies: Vec<Methodology>) -> Self {
        self.methodologies = methodologies;
        self
    }

    /// Fix the processing date used for future-row dropping and annual fills.
    pub const fn with_as_of(mut self, as_of: chrono::NaiveDate) -> Self {
        self.merge.as_of = Some(as_of);
        self
    }

    /// Normalizer settings. The processing date falls back to the merge
    /// section's, which defaults to today. Annual series are carried to the
    /// month the master table ends on.
    pub fn normalize_config(&self) -> NormalizeConfig {
        NormalizeConfig {
            as_of: Some(
                self.normalize
                    .as_of
                    .unwrap_or_else(|| self.merge.resolved_as_of()),
            ),
            ..self.normalize.clone()
        }
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Config`] for no methodologies, duplicate methodology
    ///   names, or an unsupported source.
    /// - [`PipelineError::Score`] for invalid weights or blends.
    pub fn validate(&self) -> Result<()> {
        if self.methodologies.is_empty() {
            return Err(PipelineError::Config(
                "at least one methodology is required".to_string(),
            ));
        }
        let mut names = BTreeSet::new();
        for methodology in &self.methodologies {
            methodology.validate()?;
            if !names.insert(methodology.name.as_str()) {
                return Err(PipelineError::Config(format!(
                    "duplicate methodology name: {}",
                    methodology.name
                )));
            }
        }
        for source in &self.sources {
            source.kind.validate()?;
        }
        Ok(())
    }
}
