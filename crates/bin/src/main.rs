//! Hearth CLI binary.
//!
//! Loads provider CSV extracts, runs the pipeline and writes the rankings.

use clap::{Parser, Subcommand};
use hearth::output::{ExportFormat, Exporter};
use hearth::score::{Component, Methodology};
use hearth::{Pipeline, PipelineConfig, PipelineInputs, PipelineOutput};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hearth")]
#[command(about = "Hearth: housing market data harmonization and scoring", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and write the rankings
    Rank {
        /// Pipeline configuration (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Directory relative source paths are read from (defaults to the config's directory)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Output format (csv, json or pretty-json)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Write rankings to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Also write the merged master table
        #[arg(long)]
        master: Option<PathBuf>,

        /// Also write a Markdown comparison report
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List the built-in methodologies
    Methodologies {
        /// Output format (json or text)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Check a configuration file without running it
    Validate {
        /// Pipeline configuration (JSON)
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rank {
            config,
            data_dir,
            format,
            output,
            master,
            report,
        } => {
            let format: ExportFormat = format.parse()?;
            let data_dir = data_dir.unwrap_or_else(|| parent_dir(&config));
            let config = PipelineConfig::from_path(&config)?;
            let result = rank(config, &data_dir)?;
            write_outputs(&result, format, output.as_deref(), master.as_deref())?;
            if let Some(path) = report {
                let top_n = result.top_n;
                let markdown = result.output.report(top_n)?.to_markdown();
                std::fs::write(&path, markdown)?;
                info!(path = %path.display(), "wrote comparison report");
            }
        }
        Commands::Methodologies { format } => {
            list_methodologies(&format)?;
        }
        Commands::Validate { config } => {
            let config = PipelineConfig::from_path(&config)?;
            Pipeline::new(config.clone())?;
            println!(
                "OK: {} source(s), {} methodolog{}",
                config.sources.len(),
                config.methodologies.len(),
                if config.methodologies.len() == 1 { "y" } else { "ies" }
            );
        }
    }

    Ok(())
}

struct RankRun {
    output: PipelineOutput,
    top_n: usize,
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

fn rank(config: PipelineConfig, data_dir: &Path) -> Result<RankRun, Box<dyn std::error::Error>> {
    let top_n = config.top_n;
    let inputs = PipelineInputs::read(&config, data_dir)?;
    let output = Pipeline::new(config)?.run(&inputs)?;

    for drops in &output.drops {
        if drops.report.total_dropped() > 0 {
            info!(
                source = %drops.source,
                kept = drops.report.kept,
                dropped = drops.report.total_dropped(),
                "source rows dropped"
            );
        }
    }
    Ok(RankRun { output, top_n })
}

fn write_outputs(
    result: &RankRun,
    format: ExportFormat,
    output: Option<&Path>,
    master: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = result.output.ranking_rows();
    match output {
        Some(path) => rows.export_to_file(path, format)?,
        None => print!("{}", rows.export_to_string(format)?),
    }
    if let Some(path) = master {
        result.output.master_rows().export_to_file(path, format)?;
    }
    Ok(())
}

fn list_methodologies(format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let presets = Methodology::presets();
    if format == "json" {
        let output = json!({
            "version": hearth::VERSION,
            "methodologies": presets,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{:<10} {:<13} {:>8} {:>8} {:>8} {:>8}",
        "NAME", "NORMALIZATION", "AFFORD", "GROWTH", "DEMOG", "INCOME"
    );
    for methodology in &presets {
        let weight = |c: Component| format!("{:.2}", methodology.weights.weight(c));
        println!(
            "{:<10} {:<13} {:>8} {:>8} {:>8} {:>8}",
            methodology.name,
            methodology.normalization.to_string(),
            weight(Component::Affordability),
            weight(Component::Growth),
            weight(Component::Demographic),
            weight(Component::Income),
        );
    }
    Ok(())
}
