//! Snapshot export
//!
//! Writes the finished graph as `knowledge_graph.json` plus a small
//! `knowledge_graph_meta.json` summary (counts per kind, build timestamp,
//! dataset fingerprint, data-quality counters). Both files are written only
//! after every pipeline stage succeeded; a failed run leaves no partial
//! snapshot behind.

use crate::graph::schema::KnowledgeGraph;
use crate::pipeline::RunStats;
use chrono::{DateTime, Utc};
use hfa_common::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const GRAPH_FILE: &str = "knowledge_graph.json";
pub const META_FILE: &str = "knowledge_graph_meta.json";

/// Snapshot metadata written next to the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMeta {
    pub build_timestamp: DateTime<Utc>,
    /// sha256 of the input CSV
    pub dataset_id: String,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub node_counts: BTreeMap<String, usize>,
    pub edge_counts: BTreeMap<String, usize>,
    pub stats: RunStats,
}

/// Paths written by one export
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub graph: PathBuf,
    pub meta: PathBuf,
}

/// sha256 fingerprint of an input file, lowercase hex
pub fn dataset_fingerprint(path: &Path) -> Result<String> {
    let content = fs::read(path)?;
    let digest = Sha256::digest(&content);
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

/// Write the snapshot and its metadata
pub fn export_snapshot(
    graph: &KnowledgeGraph,
    output_dir: &Path,
    dataset_id: &str,
    stats: &RunStats,
) -> Result<ExportPaths> {
    fs::create_dir_all(output_dir)?;

    let graph_path = output_dir.join(GRAPH_FILE);
    let graph_json = serde_json::to_string_pretty(graph)?;
    fs::write(&graph_path, graph_json)?;

    let meta = GraphMeta {
        build_timestamp: Utc::now(),
        dataset_id: dataset_id.to_string(),
        total_nodes: graph.total_nodes(),
        total_edges: graph.total_edges(),
        node_counts: graph.node_counts(),
        edge_counts: graph.edge_counts(),
        stats: stats.clone(),
    };
    let meta_path = output_dir.join(META_FILE);
    fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)?;

    info!(
        graph = %graph_path.display(),
        meta = %meta_path.display(),
        nodes = meta.total_nodes,
        edges = meta.total_edges,
        "Exported snapshot"
    );
    Ok(ExportPaths {
        graph: graph_path,
        meta: meta_path,
    })
}

/// Load a previously exported snapshot
pub fn load_snapshot(path: &Path) -> Result<KnowledgeGraph> {
    let content = fs::read_to_string(path)?;
    let graph: KnowledgeGraph = serde_json::from_str(&content)?;
    info!(
        path = %path.display(),
        nodes = graph.total_nodes(),
        edges = graph.total_edges(),
        "Loaded snapshot"
    );
    Ok(graph)
}
