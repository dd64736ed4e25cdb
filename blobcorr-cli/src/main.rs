use blobcorr::{AggregatedMap, KernelParam, Pipeline, PipelineConfig, Reduction, Scoring};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "BlobCorr CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ScoringConfig {
    RawCorrelation,
    Cosine,
}

impl From<ScoringConfig> for Scoring {
    fn from(value: ScoringConfig) -> Self {
        match value {
            ScoringConfig::RawCorrelation => Scoring::RawCorrelation,
            ScoringConfig::Cosine => Scoring::Cosine,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ReductionConfig {
    Mean,
    Median,
    Max,
}

impl From<ReductionConfig> for Reduction {
    fn from(value: ReductionConfig) -> Self {
        match value {
            ReductionConfig::Mean => Reduction::Mean,
            ReductionConfig::Median => Reduction::Median,
            ReductionConfig::Max => Reduction::Max,
        }
    }
}

#[derive(Debug, Deserialize)]
struct KernelConfig {
    size: usize,
    sigma: f32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    output_path: Option<String>,
    filter_intensity: f32,
    kernels: Vec<KernelConfig>,
    scoring: ScoringConfig,
    reduction: ReductionConfig,
    parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_path: String::new(),
            output_path: None,
            filter_intensity: 0.1,
            kernels: Vec::new(),
            scoring: ScoringConfig::RawCorrelation,
            reduction: ReductionConfig::Mean,
            parallel: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct HotCell {
    x: usize,
    y: usize,
    score: f32,
}

#[derive(Debug, Serialize)]
struct Output {
    width: usize,
    height: usize,
    scoring: &'static str,
    reduction: &'static str,
    max_score: f32,
    hot_cells: Vec<HotCell>,
}

impl Output {
    fn from_aggregated(aggregated: &AggregatedMap, scoring: Scoring) -> Self {
        let map = aggregated.map();
        let mut hot_cells = Vec::new();
        for y in 0..map.height() {
            for x in 0..map.width() {
                let score = map.at(x, y);
                if score > 0.0 {
                    hot_cells.push(HotCell { x, y, score });
                }
            }
        }
        hot_cells.sort_by(|a, b| b.score.total_cmp(&a.score));

        Self {
            width: map.width(),
            height: map.height(),
            scoring: scoring.name(),
            reduction: aggregated.reduction().name(),
            max_score: map.max_value().max(0.0),
            hot_cells,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("blobcorr=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }
    if config.kernels.is_empty() {
        return Err("kernels must contain at least one entry".into());
    }

    let mut kernel_params = Vec::with_capacity(config.kernels.len());
    for k in &config.kernels {
        kernel_params.push(KernelParam::new(k.size, k.sigma)?);
    }

    let scoring: Scoring = config.scoring.into();
    let pipeline = Pipeline::new(PipelineConfig {
        filter_intensity: config.filter_intensity,
        kernel_params,
        scoring,
        reduction: config.reduction.into(),
        parallel: config.parallel,
    })?;

    let aggregated = pipeline.run(&config.image_path)?;
    let output = Output::from_aggregated(&aggregated, scoring);
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
