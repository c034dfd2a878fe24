//! Pipeline orchestration
//!
//! Wires the eight stages together: load, resolve regions, deduplicate,
//! normalize, build, infer, detect deserts, validate. The caller exports the
//! snapshot afterwards; nothing is written until every stage has succeeded.

use crate::graph::desert::add_desert_edges;
use crate::graph::export::dataset_fingerprint;
use crate::graph::inference::{add_could_support_edges, add_lacks_edges};
use crate::graph::{build_graph, KnowledgeGraph};
use crate::ingest::dedup::merge_duplicates;
use crate::ingest::regions::resolve_regions;
use crate::ingest::{load_csv, SourceRecord};
use crate::vocab::cache::NormalizationCache;
use crate::vocab::classifier::Classifier;
use crate::vocab::normalizer::{NormalizationStats, Normalizer};
use hfa_common::{CountryConfig, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Stage toggles
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub skip_inference: bool,
    pub skip_deserts: bool,
}

/// Counters collected across one run, exported with the snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub rows_loaded: usize,
    /// Excluded row counts per reason
    pub rows_excluded: BTreeMap<String, usize>,
    pub json_field_errors: usize,
    pub unresolved_regions: usize,
    pub records_after_dedup: usize,
    #[serde(default)]
    pub normalization: NormalizationStats,
    pub lacks_edges: usize,
    pub could_support_edges: usize,
    pub desert_edges: usize,
}

/// Result of one pipeline run
pub struct PipelineOutput {
    pub graph: KnowledgeGraph,
    pub stats: RunStats,
    /// sha256 of the input CSV
    pub dataset_id: String,
}

/// Run the full pipeline over one CSV file
pub async fn run_pipeline(
    csv_path: &Path,
    config: &CountryConfig,
    cache: &NormalizationCache,
    classifier: &dyn Classifier,
    options: &PipelineOptions,
) -> Result<PipelineOutput> {
    let dataset_id = dataset_fingerprint(csv_path)?;
    info!(path = %csv_path.display(), dataset_id = %dataset_id, "Starting pipeline");

    let report = load_csv(csv_path)?;
    let mut records: Vec<SourceRecord> = report.records;
    let rows_loaded = records.len();
    resolve_regions(&mut records, config);
    let records = merge_duplicates(records);

    // Counted after merging: a region resolved on any source row of an
    // entity resolves the merged record
    let unresolved_regions = records
        .iter()
        .filter(|record| record.resolved_region.is_none())
        .count();

    let mut stats = RunStats {
        rows_loaded,
        rows_excluded: report.excluded,
        json_field_errors: report.json_field_errors,
        unresolved_regions,
        records_after_dedup: records.len(),
        ..Default::default()
    };

    let normalizer = Normalizer::new(cache, classifier)?;
    let (claims, normalization_stats) = normalizer.normalize(&records).await?;
    stats.normalization = normalization_stats;

    let mut graph = build_graph(&records, config, &claims);

    if options.skip_inference {
        info!("Skipping inference stage");
    } else {
        stats.lacks_edges = add_lacks_edges(&mut graph);
        stats.could_support_edges = add_could_support_edges(&mut graph);
    }

    if options.skip_deserts {
        info!("Skipping desert detection");
    } else {
        stats.desert_edges = add_desert_edges(&mut graph, config);
    }

    graph.validate()?;

    info!(
        nodes = graph.total_nodes(),
        edges = graph.total_edges(),
        "Pipeline finished"
    );
    Ok(PipelineOutput {
        graph,
        stats,
        dataset_id,
    })
}
