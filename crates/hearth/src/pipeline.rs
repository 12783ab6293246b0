//! End-to-end run: raw extracts in, ranked methodologies out.

use crate::config::{PipelineConfig, SourceKind};
use crate::error::{PipelineError, Result};
use hearth_data::sources::load_resolver;
use hearth_data::{
    DatasetMerger, DropReport, FrequencyNormalizer, MasterTable, Measure, MergeReport,
    ObservationSeries,
};
use hearth_geo::GeoKeyResolver;
use hearth_metrics::{MetricEngine, MetricSnapshot, SnapshotBuilder, SnapshotReport};
use hearth_output::{ComparisonReport, MasterRow, RankingRow, master_rows, ranking_rows};
use hearth_score::{MethodologyComparison, ScoreTable, ScoringEngine, compare_all};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A raw extract tagged with its provider layout.
#[derive(Debug, Clone)]
pub struct SourceTable {
    /// Provider layout.
    pub kind: SourceKind,
    /// Table as published.
    pub frame: DataFrame,
}

impl SourceTable {
    /// Tag a frame.
    pub const fn new(kind: SourceKind, frame: DataFrame) -> Self {
        Self { kind, frame }
    }
}

/// Everything a run reads.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    /// County-to-CBSA delineation table.
    pub crosswalk: DataFrame,
    /// Source extracts.
    pub sources: Vec<SourceTable>,
}

/// Read a CSV file with a header row, inferring types over the whole file.
///
/// # Errors
///
/// Returns [`PipelineError::Read`] naming the file.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let read = || {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()
    };
    read().map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn resolve(dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    }
}

impl PipelineInputs {
    /// Inputs from in-memory frames.
    pub const fn new(crosswalk: DataFrame, sources: Vec<SourceTable>) -> Self {
        Self { crosswalk, sources }
    }

    /// Read the crosswalk and every configured source from disk. Relative paths
    /// are taken from `dir`.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Config`] when no crosswalk is configured.
    /// - [`PipelineError::Read`] when a file cannot be parsed.
    pub fn read(config: &PipelineConfig, dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let crosswalk = config
            .crosswalk
            .as_deref()
            .ok_or_else(|| PipelineError::Config("no crosswalk file configured".to_string()))?;
        let crosswalk = read_csv(&resolve(dir, crosswalk))?;
        let sources = config
            .sources
            .iter()
            .map(|source| {
                let frame = read_csv(&resolve(dir, &source.path))?;
                info!(source = %source.kind, rows = frame.height(), "read source file");
                Ok(SourceTable::new(source.kind, frame))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(crosswalk, sources))
    }
}

/// Rows an adapter dropped, per source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDrops {
    /// Source label.
    pub source: String,
    /// Drop counts.
    pub report: DropReport,
}

/// Result of a run.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Resolver built from the crosswalk.
    pub resolver: GeoKeyResolver,
    /// Merged, gap-filled master table.
    pub master: MasterTable,
    /// Merge counters.
    pub merge_report: MergeReport,
    /// Adapter drop counts, in source order.
    pub drops: Vec<SourceDrops>,
    /// Snapshot counters.
    pub snapshot_report: SnapshotReport,
    /// One snapshot per scored entity.
    pub snapshots: Vec<MetricSnapshot>,
    /// One table per methodology, in configuration order.
    pub rankings: Vec<ScoreTable>,
    /// Every ranking after the first compared against the first.
    pub comparisons: Vec<MethodologyComparison>,
}

impl PipelineOutput {
    /// Ranking of one methodology.
    pub fn ranking(&self, name: &str) -> Option<&ScoreTable> {
        self.rankings.iter().find(|table| table.name() == name)
    }

    /// Ranking rows of every methodology, with display names from the crosswalk.
    pub fn ranking_rows(&self) -> Vec<RankingRow> {
        self.rankings
            .iter()
            .flat_map(|table| ranking_rows(table, Some(&self.resolver)))
            .collect()
    }

    /// Master table rows with coverage flags.
    pub fn master_rows(&self) -> Vec<MasterRow> {
        master_rows(&self.master)
    }

    /// Markdown-ready comparison of the rankings.
    pub fn report(&self, top_n: usize) -> Result<ComparisonReport> {
        Ok(ComparisonReport::new(self.rankings.clone(), Some(&self.resolver))?.with_top_n(top_n))
    }
}

/// Runs every stage in order.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    metrics: MetricEngine,
    scoring: ScoringEngine,
}

impl Pipeline {
    /// Build a pipeline.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid or names an unknown metric.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let metrics = match &config.metrics {
            Some(names) => {
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                MetricEngine::with_metrics(&names)?
            }
            None => MetricEngine::new(),
        };
        Ok(Self {
            config,
            metrics,
            scoring: ScoringEngine::new(),
        })
    }

    /// Replace the scoring engine (for a custom yield estimator).
    pub fn with_scoring_engine(mut self, scoring: ScoringEngine) -> Self {
        self.scoring = scoring;
        self
    }

    /// Current configuration.
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline.
    ///
    /// # Errors
    ///
    /// - [`hearth_data::DataError::MissingSource`] when no home value source is given.
    /// - Any structural error from a stage. Row-level problems are counted in the
    ///   reports instead.
    pub fn run(&self, inputs: &PipelineInputs) -> Result<PipelineOutput> {
        let resolver = load_resolver(&inputs.crosswalk)?;

        let (base, sources, drops) = self.load_sources(inputs, &resolver)?;
        let merger = DatasetMerger::with_config(&resolver, self.config.merge.clone());
        let source_refs: Vec<&ObservationSeries> = sources.iter().collect();
        let (master, merge_report) = merger.merge(base.as_ref(), &source_refs)?;

        let metric_table = self.metrics.compute_metrics(&master)?;
        let snapshot_set = SnapshotBuilder::with_config(self.config.snapshot.clone())
            .build(&metric_table);
        let snapshots = snapshot_set.snapshots;

        let rankings = self
            .scoring
            .score_all(&snapshots, &self.config.methodologies)?;
        let comparisons = compare_all(&rankings)?;

        info!(
            entities = snapshots.len(),
            methodologies = rankings.len(),
            "pipeline complete"
        );
        Ok(PipelineOutput {
            resolver,
            master,
            merge_report,
            drops,
            snapshot_report: snapshot_set.report,
            snapshots,
            rankings,
            comparisons,
        })
    }

    /// Run every adapter and align its output onto the monthly calendar. Home
    /// value series are gathered into the merge base.
    fn load_sources(
        &self,
        inputs: &PipelineInputs,
        resolver: &GeoKeyResolver,
    ) -> Result<(Option<ObservationSeries>, Vec<ObservationSeries>, Vec<SourceDrops>)> {
        let normalizer = FrequencyNormalizer::with_config(self.config.normalize_config());
        let mut base: Option<ObservationSeries> = None;
        let mut sources = Vec::new();
        let mut drops = Vec::with_capacity(inputs.sources.len());

        for table in &inputs.sources {
            let (series, report) = table.kind.load(&table.frame, resolver)?;
            drops.push(SourceDrops {
                source: table.kind.to_string(),
                report,
            });
            if series.is_empty() {
                warn!(source = %table.kind, "source produced no observations");
            }
            let frequency = series.frequency;
            let monthly = normalizer.normalize_to_monthly(series, frequency);
            if monthly.measure == Measure::HomeValue {
                match base.as_mut() {
                    Some(existing) => existing.extend(monthly),
                    None => base = Some(monthly),
                }
            } else {
                sources.push(monthly);
            }
        }
        Ok((base, sources, drops))
    }
}
