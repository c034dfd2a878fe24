//! hfa-graph - Healthcare Facility Knowledge Graph builder
//!
//! Reads a scraped facility CSV, normalizes free-text equipment and
//! capability claims against the controlled vocabulary, builds the typed
//! knowledge graph with inferred LACKS / COULD_SUPPORT / DESERT_FOR edges,
//! and exports the snapshot as JSON.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use hfa_common::CountryConfig;
use hfa_graph::graph::export::export_snapshot;
use hfa_graph::vocab::cache::NormalizationCache;
use hfa_graph::vocab::classifier::{Classifier, HttpClassifier, NoopClassifier};
use hfa_graph::{run_pipeline, PipelineOptions};

#[derive(Parser, Debug)]
#[command(name = "hfa-graph", version, about = "Build a healthcare facility knowledge graph from a scraped CSV")]
struct Args {
    /// Input CSV of scraped facility records
    csv_path: PathBuf,

    /// Country configuration (regions, aliases, adjacency)
    #[arg(long, default_value = "config/ghana.toml")]
    config: PathBuf,

    /// Normalization cache database
    #[arg(long, default_value = "data/normalization_cache.sqlite")]
    cache: PathBuf,

    /// Directory for the exported snapshot
    #[arg(long, default_value = "data")]
    output_dir: PathBuf,

    /// Base URL of the phrase classification service; without it unmatched
    /// phrases stay unmatched
    #[arg(long)]
    classifier_url: Option<String>,

    /// Skip LACKS / COULD_SUPPORT inference
    #[arg(long)]
    skip_inference: bool,

    /// Skip desert detection
    #[arg(long)]
    skip_deserts: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Starting hfa-graph");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Input: {}", args.csv_path.display());

    // Step 1: Load country configuration
    let config = CountryConfig::load(&args.config)?;

    // Step 2: Open the normalization cache
    if let Some(parent) = args.cache.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let cache = NormalizationCache::open(&args.cache).await?;
    info!("Cache: {}", args.cache.display());

    // Step 3: Pick the classifier backend
    let classifier: Box<dyn Classifier> = match &args.classifier_url {
        Some(url) => {
            info!("Classifier: {}", url);
            Box::new(HttpClassifier::new(url.clone())?)
        }
        None => {
            info!("Classifier: none (keyword matching only)");
            Box::new(NoopClassifier)
        }
    };

    // Step 4: Run the pipeline
    let options = PipelineOptions {
        skip_inference: args.skip_inference,
        skip_deserts: args.skip_deserts,
    };
    let output = run_pipeline(
        &args.csv_path,
        &config,
        &cache,
        classifier.as_ref(),
        &options,
    )
    .await?;

    // Step 5: Export the snapshot
    let paths = export_snapshot(
        &output.graph,
        &args.output_dir,
        &output.dataset_id,
        &output.stats,
    )?;
    info!("Graph written to {}", paths.graph.display());

    Ok(())
}
