//! Read-only query surface
//!
//! Pure functions over a finished [`KnowledgeGraph`] returning plain serde
//! structs. Arguments are primitives (canonical keys, region keys, facility
//! pks); no internal graph types cross this boundary. Result ordering is
//! deterministic: the stated sort key first, then the node identifier.

use crate::graph::schema::{facility_id, FacilityNode, KnowledgeGraph};
use hfa_common::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Serialize)]
pub struct SpecialtyClaim {
    pub key: String,
    pub display_name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapabilityClaim {
    pub key: String,
    pub display_name: String,
    pub confidence: f64,
    pub source_field: String,
    pub raw_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EquipmentClaim {
    pub key: String,
    pub display_name: String,
    pub confidence: f64,
    pub raw_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LacksInfo {
    pub equipment: String,
    pub display_name: String,
    pub required_by: Vec<String>,
    pub evidence_status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CouldSupportInfo {
    pub capability: String,
    pub display_name: String,
    pub readiness: f64,
    pub existing_equipment: Vec<String>,
    pub missing_equipment: Vec<String>,
}

/// Full facility view with all outgoing edges resolved
#[derive(Debug, Clone, Serialize)]
pub struct FacilityDetails {
    pub facility_id: String,
    pub name: String,
    pub region: Option<String>,
    pub city: Option<String>,
    pub facility_type: Option<String>,
    pub capacity: Option<i64>,
    pub number_doctors: Option<i64>,
    pub year_established: Option<i64>,
    pub source_count: u32,
    pub specialties: Vec<SpecialtyClaim>,
    pub capabilities: Vec<CapabilityClaim>,
    pub equipment: Vec<EquipmentClaim>,
    pub lacks: Vec<LacksInfo>,
    pub could_support: Vec<CouldSupportInfo>,
}

/// LACKS context for one facility
#[derive(Debug, Clone, Serialize)]
pub struct FacilityMismatches {
    pub facility_id: String,
    pub facility_name: String,
    pub region: Option<String>,
    pub lacks: Vec<LacksInfo>,
    pub claimed_capabilities: Vec<String>,
    pub confirmed_equipment: Vec<String>,
    /// missing required equipment / total required equipment, over every
    /// claimed capability with a requirements entry
    pub mismatch_ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DesertInfo {
    pub region: String,
    pub region_name: String,
    pub population: u64,
    pub facility_count: usize,
    pub severity: f64,
    pub nearest_region: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CouldSupportFacility {
    pub facility_id: String,
    pub facility_name: String,
    pub region: Option<String>,
    pub readiness: f64,
    pub existing_equipment: Vec<String>,
    pub missing_equipment: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FacilitySearchHit {
    pub facility_id: String,
    pub facility_name: String,
    pub region: Option<String>,
    pub city: Option<String>,
    pub facility_type: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionComparison {
    pub region: String,
    pub region_name: String,
    pub population: u64,
    pub facility_count: usize,
    pub facility_names: Vec<String>,
    pub is_desert: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphSummary {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub node_counts: BTreeMap<String, usize>,
    pub edge_counts: BTreeMap<String, usize>,
}

fn facility<'a>(graph: &'a KnowledgeGraph, pk: &str) -> Result<&'a FacilityNode> {
    graph
        .facilities
        .get(pk)
        .ok_or_else(|| Error::NotFound(format!("Facility '{}' not found", pk)))
}

fn capability_display(graph: &KnowledgeGraph, key: &str) -> String {
    graph
        .capabilities
        .get(key)
        .map(|n| n.display_name.clone())
        .unwrap_or_else(|| key.to_string())
}

fn equipment_display(graph: &KnowledgeGraph, key: &str) -> String {
    graph
        .equipment
        .get(key)
        .map(|n| n.display_name.clone())
        .unwrap_or_else(|| key.to_string())
}

fn lacks_info(graph: &KnowledgeGraph, pk: &str) -> Vec<LacksInfo> {
    graph
        .lacks
        .get(pk)
        .map(|targets| {
            targets
                .iter()
                .map(|(key, edge)| LacksInfo {
                    equipment: key.clone(),
                    display_name: equipment_display(graph, key),
                    required_by: edge.required_by.clone(),
                    evidence_status: edge.evidence_status.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Full detail view for one facility
pub fn get_facility_details(graph: &KnowledgeGraph, pk: &str) -> Result<FacilityDetails> {
    let node = facility(graph, pk)?;

    let specialties = graph
        .has_specialty
        .get(pk)
        .map(|targets| {
            targets
                .iter()
                .map(|(key, edge)| SpecialtyClaim {
                    key: key.clone(),
                    display_name: graph
                        .specialties
                        .get(key)
                        .map(|n| n.display_name.clone())
                        .unwrap_or_else(|| key.clone()),
                    confidence: edge.confidence,
                })
                .collect()
        })
        .unwrap_or_default();

    let capabilities = graph
        .has_capability
        .get(pk)
        .map(|targets| {
            targets
                .iter()
                .map(|(key, edge)| CapabilityClaim {
                    key: key.clone(),
                    display_name: capability_display(graph, key),
                    confidence: edge.confidence,
                    source_field: edge.source_field.clone(),
                    raw_text: edge.raw_text.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    let equipment = graph
        .has_equipment
        .get(pk)
        .map(|targets| {
            targets
                .iter()
                .map(|(key, edge)| EquipmentClaim {
                    key: key.clone(),
                    display_name: equipment_display(graph, key),
                    confidence: edge.confidence,
                    raw_text: edge.raw_text.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    let could_support = graph
        .could_support
        .get(pk)
        .map(|targets| {
            targets
                .iter()
                .map(|(key, edge)| CouldSupportInfo {
                    capability: key.clone(),
                    display_name: capability_display(graph, key),
                    readiness: edge.readiness,
                    existing_equipment: edge.existing_equipment.clone(),
                    missing_equipment: edge.missing_equipment.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(FacilityDetails {
        facility_id: facility_id(pk),
        name: node.name.clone(),
        region: node.region.clone(),
        city: node.city.clone(),
        facility_type: node.facility_type.clone(),
        capacity: node.capacity,
        number_doctors: node.number_doctors,
        year_established: node.year_established,
        source_count: node.source_count,
        specialties,
        capabilities,
        equipment,
        lacks: lacks_info(graph, pk),
        could_support,
    })
}

/// LACKS context and mismatch ratio for one facility
pub fn get_facility_mismatches(graph: &KnowledgeGraph, pk: &str) -> Result<FacilityMismatches> {
    let node = facility(graph, pk)?;

    let claimed: Vec<String> = graph
        .facility_capabilities(pk)
        .into_iter()
        .map(String::from)
        .collect();
    let confirmed: Vec<String> = graph
        .facility_equipment(pk)
        .into_iter()
        .map(String::from)
        .collect();

    // Union of required equipment across every claimed capability
    let mut required: BTreeSet<&str> = BTreeSet::new();
    for cap in &claimed {
        if let Some(reqs) = crate::graph::requirements::requirements_for(cap) {
            required.extend(reqs.required.iter().copied());
        }
    }
    let owned: BTreeSet<&str> = confirmed.iter().map(String::as_str).collect();
    let missing = required.iter().filter(|eq| !owned.contains(**eq)).count();
    let ratio = if required.is_empty() {
        0.0
    } else {
        missing as f64 / required.len() as f64
    };

    Ok(FacilityMismatches {
        facility_id: facility_id(pk),
        facility_name: node.name.clone(),
        region: node.region.clone(),
        lacks: lacks_info(graph, pk),
        claimed_capabilities: claimed,
        confirmed_equipment: confirmed,
        mismatch_ratio: (ratio * 1000.0).round() / 1000.0,
    })
}

/// Facilities whose mismatch ratio meets the threshold, worst first
pub fn find_suspicious_facilities(
    graph: &KnowledgeGraph,
    min_ratio: f64,
) -> Vec<FacilityMismatches> {
    let mut results: Vec<FacilityMismatches> = graph
        .facilities
        .keys()
        .filter_map(|pk| get_facility_mismatches(graph, pk).ok())
        .filter(|m| m.mismatch_ratio >= min_ratio && !m.lacks.is_empty())
        .collect();
    results.sort_by(|a, b| {
        b.mismatch_ratio
            .total_cmp(&a.mismatch_ratio)
            .then_with(|| a.facility_id.cmp(&b.facility_id))
    });
    results
}

/// Desert regions for a specialty, worst severity first
pub fn get_deserts_for_specialty(graph: &KnowledgeGraph, specialty_key: &str) -> Vec<DesertInfo> {
    let mut results: Vec<DesertInfo> = graph
        .desert_for
        .iter()
        .filter_map(|(region_key, targets)| {
            let edge = targets.get(specialty_key)?;
            let region = graph.regions.get(region_key)?;
            Some(DesertInfo {
                region: region_key.clone(),
                region_name: region.name.clone(),
                population: edge.population,
                facility_count: edge.facility_count,
                severity: edge.severity,
                nearest_region: edge.nearest_region.clone(),
            })
        })
        .collect();
    results.sort_by(|a, b| {
        b.severity
            .total_cmp(&a.severity)
            .then_with(|| a.region.cmp(&b.region))
    });
    results
}

/// Facilities that could support a capability, most ready first
pub fn get_could_support_facilities(
    graph: &KnowledgeGraph,
    capability_key: &str,
) -> Vec<CouldSupportFacility> {
    let mut results: Vec<CouldSupportFacility> = graph
        .could_support
        .iter()
        .filter_map(|(pk, targets)| {
            let edge = targets.get(capability_key)?;
            let node = graph.facilities.get(pk)?;
            Some(CouldSupportFacility {
                facility_id: facility_id(pk),
                facility_name: node.name.clone(),
                region: node.region.clone(),
                readiness: edge.readiness,
                existing_equipment: edge.existing_equipment.clone(),
                missing_equipment: edge.missing_equipment.clone(),
            })
        })
        .collect();
    results.sort_by(|a, b| {
        b.readiness
            .total_cmp(&a.readiness)
            .then_with(|| a.facility_id.cmp(&b.facility_id))
    });
    results
}

fn search_edge_map<T>(
    graph: &KnowledgeGraph,
    edges: &BTreeMap<String, BTreeMap<String, T>>,
    target_key: &str,
    region: Option<&str>,
    limit: Option<usize>,
    confidence_of: impl Fn(&T) -> f64,
) -> Vec<FacilitySearchHit> {
    let mut results: Vec<FacilitySearchHit> = edges
        .iter()
        .filter_map(|(pk, targets)| {
            let edge = targets.get(target_key)?;
            let node = graph.facilities.get(pk)?;
            if let Some(region) = region {
                if node.region.as_deref() != Some(region) {
                    return None;
                }
            }
            Some(FacilitySearchHit {
                facility_id: facility_id(pk),
                facility_name: node.name.clone(),
                region: node.region.clone(),
                city: node.city.clone(),
                facility_type: node.facility_type.clone(),
                confidence: confidence_of(edge),
            })
        })
        .collect();
    results.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.facility_id.cmp(&b.facility_id))
    });
    if let Some(limit) = limit {
        results.truncate(limit);
    }
    results
}

/// Facilities claiming a capability, optionally region-scoped
pub fn search_facilities_by_capability(
    graph: &KnowledgeGraph,
    capability_key: &str,
    region: Option<&str>,
    limit: Option<usize>,
) -> Vec<FacilitySearchHit> {
    search_edge_map(graph, &graph.has_capability, capability_key, region, limit, |e| {
        e.confidence
    })
}

/// Facilities claiming an equipment item, optionally region-scoped
pub fn search_facilities_by_equipment(
    graph: &KnowledgeGraph,
    equipment_key: &str,
    region: Option<&str>,
    limit: Option<usize>,
) -> Vec<FacilitySearchHit> {
    search_edge_map(graph, &graph.has_equipment, equipment_key, region, limit, |e| {
        e.confidence
    })
}

/// Facilities with a specialty, optionally region-scoped
pub fn search_facilities_by_specialty(
    graph: &KnowledgeGraph,
    specialty_key: &str,
    region: Option<&str>,
    limit: Option<usize>,
) -> Vec<FacilitySearchHit> {
    search_edge_map(graph, &graph.has_specialty, specialty_key, region, limit, |e| {
        e.confidence
    })
}

/// Facility counts per specialty per region
///
/// Facilities without a resolved region are excluded.
pub fn get_specialty_distribution(
    graph: &KnowledgeGraph,
) -> BTreeMap<String, BTreeMap<String, usize>> {
    let mut distribution: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();

    for (pk, targets) in &graph.has_specialty {
        let Some(region) = graph.facilities.get(pk).and_then(|f| f.region.clone()) else {
            continue;
        };
        for (slug, edge) in targets {
            if edge.confidence < crate::graph::schema::CONFIDENCE_FLOOR {
                continue;
            }
            *distribution
                .entry(slug.clone())
                .or_default()
                .entry(region.clone())
                .or_default() += 1;
        }
    }
    distribution
}

/// All regions ranked by facility count for one specialty
pub fn get_regional_comparison(
    graph: &KnowledgeGraph,
    specialty_key: &str,
) -> Vec<RegionComparison> {
    let mut comparisons: BTreeMap<&str, RegionComparison> = graph
        .regions
        .iter()
        .map(|(key, region)| {
            (
                key.as_str(),
                RegionComparison {
                    region: key.clone(),
                    region_name: region.name.clone(),
                    population: region.population,
                    facility_count: 0,
                    facility_names: Vec::new(),
                    is_desert: graph
                        .desert_for
                        .get(key)
                        .map(|t| t.contains_key(specialty_key))
                        .unwrap_or(false),
                },
            )
        })
        .collect();

    for (pk, targets) in &graph.has_specialty {
        let Some(edge) = targets.get(specialty_key) else {
            continue;
        };
        if edge.confidence < crate::graph::schema::CONFIDENCE_FLOOR {
            continue;
        }
        let Some(node) = graph.facilities.get(pk) else {
            continue;
        };
        let Some(region) = node.region.as_deref() else {
            continue;
        };
        if let Some(entry) = comparisons.get_mut(region) {
            entry.facility_count += 1;
            entry.facility_names.push(node.name.clone());
        }
    }

    let mut results: Vec<RegionComparison> = comparisons.into_values().collect();
    results.sort_by(|a, b| {
        b.facility_count
            .cmp(&a.facility_count)
            .then_with(|| a.region.cmp(&b.region))
    });
    results
}

/// Node and edge counts
pub fn get_graph_summary(graph: &KnowledgeGraph) -> GraphSummary {
    GraphSummary {
        total_nodes: graph.total_nodes(),
        total_edges: graph.total_edges(),
        node_counts: graph.node_counts(),
        edge_counts: graph.edge_counts(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::graph::desert::add_desert_edges;
    use crate::graph::inference::{add_could_support_edges, add_lacks_edges};
    use crate::ingest::SourceRecord;
    use crate::vocab::{Domain, NormalizedClaim};
    use hfa_common::CountryConfig;
    use std::io::Write;

    fn test_config() -> CountryConfig {
        let content = r#"
country = "testland"

[regions.alpha]
display_name = "Alpha"
population = 500000
capital = "Alpha City"
lat = 1.0
lng = 2.0
adjacent = ["beta"]

[regions.beta]
display_name = "Beta"
population = 100000
capital = "Beta Town"
lat = 3.0
lng = 4.0
adjacent = ["alpha"]
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        CountryConfig::load(file.path()).unwrap()
    }

    fn claim(domain: Domain, key: &str, confidence: f64) -> NormalizedClaim {
        NormalizedClaim {
            domain,
            key: key.to_string(),
            confidence,
            raw_text: key.to_string(),
            source_field: "test".to_string(),
        }
    }

    fn sample_graph() -> KnowledgeGraph {
        let records = vec![
            SourceRecord {
                pk: "1".into(),
                name: "Alpha Eye Clinic".into(),
                resolved_region: Some("alpha".into()),
                specialties: vec!["Ophthalmology".into()],
                ..Default::default()
            },
            SourceRecord {
                pk: "2".into(),
                name: "Beta General".into(),
                resolved_region: Some("beta".into()),
                ..Default::default()
            },
        ];
        let mut claims = BTreeMap::new();
        claims.insert(
            "1".to_string(),
            vec![
                claim(Domain::Capability, "cataract_surgery", 0.8),
                claim(Domain::Equipment, "operating_theatre", 0.8),
            ],
        );
        claims.insert(
            "2".to_string(),
            vec![
                claim(Domain::Equipment, "operating_theatre", 0.8),
                claim(Domain::Equipment, "operating_microscope", 0.6),
                claim(Domain::Equipment, "autoclave", 0.8),
            ],
        );

        let config = test_config();
        let mut graph = build_graph(&records, &config, &claims);
        add_lacks_edges(&mut graph);
        add_could_support_edges(&mut graph);
        add_desert_edges(&mut graph, &config);
        graph.validate().unwrap();
        graph
    }

    #[test]
    fn facility_details_resolve_display_names() {
        let graph = sample_graph();
        let details = get_facility_details(&graph, "1").unwrap();
        assert_eq!(details.facility_id, "facility::1");
        assert_eq!(details.specialties[0].key, "ophthalmology");
        assert_eq!(details.capabilities[0].display_name, "Cataract Surgery");
        assert_eq!(details.lacks.len(), 3);
    }

    #[test]
    fn unknown_facility_is_not_found() {
        let graph = sample_graph();
        assert!(matches!(
            get_facility_details(&graph, "404"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn mismatch_ratio_counts_missing_required() {
        let graph = sample_graph();
        let mismatches = get_facility_mismatches(&graph, "1").unwrap();
        // cataract surgery requires 4 items, facility owns 1
        assert_eq!(mismatches.mismatch_ratio, 0.75);
        assert_eq!(mismatches.lacks.len(), 3);

        // no claimed capabilities, ratio 0
        let clean = get_facility_mismatches(&graph, "2").unwrap();
        assert_eq!(clean.mismatch_ratio, 0.0);
    }

    #[test]
    fn suspicious_facilities_sorted_by_ratio() {
        let graph = sample_graph();
        let suspicious = find_suspicious_facilities(&graph, 0.3);
        assert_eq!(suspicious.len(), 1);
        assert_eq!(suspicious[0].facility_id, "facility::1");
        assert!(find_suspicious_facilities(&graph, 0.9).is_empty());
    }

    #[test]
    fn deserts_sorted_by_severity() {
        let graph = sample_graph();
        let deserts = get_deserts_for_specialty(&graph, "ophthalmology");
        // alpha is covered; only beta is a desert
        assert_eq!(deserts.len(), 1);
        assert_eq!(deserts[0].region, "beta");
        assert_eq!(deserts[0].nearest_region.as_deref(), Some("alpha"));
    }

    #[test]
    fn could_support_sorted_by_readiness() {
        let graph = sample_graph();
        let candidates = get_could_support_facilities(&graph, "cataract_surgery");
        // facility 2 owns 3 of 4 required and does not claim it
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].facility_id, "facility::2");
        assert_eq!(candidates[0].readiness, 0.75);
    }

    #[test]
    fn search_filters_by_region_and_limit() {
        let graph = sample_graph();
        let all = search_facilities_by_equipment(&graph, "operating_theatre", None, None);
        assert_eq!(all.len(), 2);

        let alpha_only =
            search_facilities_by_equipment(&graph, "operating_theatre", Some("alpha"), None);
        assert_eq!(alpha_only.len(), 1);
        assert_eq!(alpha_only[0].facility_id, "facility::1");

        let limited = search_facilities_by_equipment(&graph, "operating_theatre", None, Some(1));
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn specialty_distribution_counts_by_region() {
        let graph = sample_graph();
        let distribution = get_specialty_distribution(&graph);
        assert_eq!(distribution["ophthalmology"]["alpha"], 1);
        assert!(distribution["ophthalmology"].get("beta").is_none());
    }

    #[test]
    fn regional_comparison_marks_deserts() {
        let graph = sample_graph();
        let comparison = get_regional_comparison(&graph, "ophthalmology");
        assert_eq!(comparison.len(), 2);
        assert_eq!(comparison[0].region, "alpha");
        assert_eq!(comparison[0].facility_count, 1);
        assert!(!comparison[0].is_desert);
        assert!(comparison[1].is_desert);
    }

    #[test]
    fn graph_summary_counts() {
        let graph = sample_graph();
        let summary = get_graph_summary(&graph);
        assert_eq!(summary.node_counts["facility"], 2);
        assert_eq!(summary.node_counts["region"], 2);
        assert!(summary.total_edges > 0);
    }
}
