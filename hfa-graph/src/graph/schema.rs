//! Graph schema: typed node arenas and typed edge collections
//!
//! Nodes live in one `BTreeMap` arena per kind, keyed by the bare key
//! (region key, facility pk, canonical vocabulary key, specialty slug).
//! Edges live in one nested map per edge kind, keyed source → target.
//! `BTreeMap` everywhere keeps iteration, and therefore every derived edge
//! and the exported snapshot, deterministic.
//!
//! Kind-prefixed identifiers (`facility::42`, `region::ashanti`) appear only
//! at the query boundary and in the exported snapshot.

use hfa_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::vocab::tables::Complexity;

/// Minimum confidence for a claim edge to enter the graph
pub const CONFIDENCE_FLOOR: f64 = 0.5;

/// Nested edge map: source key → target key → edge payload
pub type EdgeMap<T> = BTreeMap<String, BTreeMap<String, T>>;

pub fn region_id(key: &str) -> String {
    format!("region::{}", key)
}

pub fn facility_id(pk: &str) -> String {
    format!("facility::{}", pk)
}

pub fn org_id(pk: &str) -> String {
    format!("org::{}", pk)
}

pub fn capability_id(key: &str) -> String {
    format!("capability::{}", key)
}

pub fn equipment_id(key: &str) -> String {
    format!("equipment::{}", key)
}

pub fn specialty_id(key: &str) -> String {
    format!("specialty::{}", key)
}

/// Slugify a raw specialty string into a stable node key
///
/// Lowercases, maps runs of non-alphanumeric characters to single
/// underscores, trims leading/trailing underscores.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut last_was_sep = true;
    for ch in raw.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('_');
            last_was_sep = true;
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionNode {
    pub key: String,
    pub name: String,
    pub population: u64,
    pub capital: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacilityNode {
    pub pk: String,
    pub name: String,
    pub facility_type: Option<String>,
    pub operator_type: Option<String>,
    pub capacity: Option<i64>,
    pub number_doctors: Option<i64>,
    pub area: Option<f64>,
    pub year_established: Option<i64>,
    pub city: Option<String>,
    /// Canonical region key; None when region resolution failed
    pub region: Option<String>,
    pub source_count: u32,
    pub email: Option<String>,
    pub phone_numbers: Vec<String>,
    pub websites: Vec<String>,
    pub description: Option<String>,
    /// Raw free-text lists kept for search even when normalization missed them
    pub raw_procedures: Vec<String>,
    pub raw_equipment: Vec<String>,
    pub raw_capabilities: Vec<String>,
    pub quality_flags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizationNode {
    pub pk: String,
    pub name: String,
    pub countries: Vec<String>,
    pub mission_summary: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone_numbers: Vec<String>,
    pub websites: Vec<String>,
    pub source_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityNode {
    pub key: String,
    pub display_name: String,
    pub category: String,
    pub complexity: Complexity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentNode {
    pub key: String,
    pub display_name: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialtyNode {
    pub key: String,
    pub display_name: String,
}

/// Facility → region placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatedInEdge {
    pub region: String,
    pub city: Option<String>,
}

/// A normalized claim edge (HAS_EQUIPMENT, HAS_CAPABILITY, HAS_SPECIALTY)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimEdge {
    pub confidence: f64,
    pub raw_text: String,
    pub source_field: String,
}

/// Required equipment a facility shows no evidence of
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LacksEdge {
    /// Claimed capabilities that require this equipment, sorted
    pub required_by: Vec<String>,
    pub evidence_status: String,
}

/// Capability a facility could plausibly offer given its equipment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouldSupportEdge {
    /// Fraction of required equipment present, in [0.6, 1.0)
    pub readiness: f64,
    pub existing_equipment: Vec<String>,
    pub missing_equipment: Vec<String>,
}

/// Region with insufficient coverage for a specialty
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesertEdge {
    pub facility_count: usize,
    pub population: u64,
    /// population / (facility_count + 1), rounded to one decimal
    pub severity: f64,
    /// Nearest covered region by adjacency hops; None when unreachable
    pub nearest_region: Option<String>,
}

/// Organization → region presence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatesInEdge {
    pub source: String,
}

/// The complete typed knowledge graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub regions: BTreeMap<String, RegionNode>,
    pub facilities: BTreeMap<String, FacilityNode>,
    pub organizations: BTreeMap<String, OrganizationNode>,
    pub capabilities: BTreeMap<String, CapabilityNode>,
    pub equipment: BTreeMap<String, EquipmentNode>,
    pub specialties: BTreeMap<String, SpecialtyNode>,

    /// facility pk → placement
    pub located_in: BTreeMap<String, LocatedInEdge>,
    /// facility pk → equipment key → claim
    pub has_equipment: EdgeMap<ClaimEdge>,
    /// facility pk → capability key → claim
    pub has_capability: EdgeMap<ClaimEdge>,
    /// facility pk → specialty slug → claim
    pub has_specialty: EdgeMap<ClaimEdge>,
    /// facility pk → equipment key → lacks
    pub lacks: EdgeMap<LacksEdge>,
    /// facility pk → capability key → could-support
    pub could_support: EdgeMap<CouldSupportEdge>,
    /// region key → specialty slug → desert
    pub desert_for: EdgeMap<DesertEdge>,
    /// organization pk → region key → presence
    pub operates_in: EdgeMap<OperatesInEdge>,
}

impl KnowledgeGraph {
    pub fn total_nodes(&self) -> usize {
        self.regions.len()
            + self.facilities.len()
            + self.organizations.len()
            + self.capabilities.len()
            + self.equipment.len()
            + self.specialties.len()
    }

    pub fn total_edges(&self) -> usize {
        self.edge_counts().values().sum()
    }

    pub fn node_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        counts.insert("region".to_string(), self.regions.len());
        counts.insert("facility".to_string(), self.facilities.len());
        counts.insert("organization".to_string(), self.organizations.len());
        counts.insert("capability".to_string(), self.capabilities.len());
        counts.insert("equipment".to_string(), self.equipment.len());
        counts.insert("specialty".to_string(), self.specialties.len());
        counts
    }

    pub fn edge_counts(&self) -> BTreeMap<String, usize> {
        fn nested<T>(map: &EdgeMap<T>) -> usize {
            map.values().map(|targets| targets.len()).sum()
        }
        let mut counts = BTreeMap::new();
        counts.insert("LOCATED_IN".to_string(), self.located_in.len());
        counts.insert("HAS_EQUIPMENT".to_string(), nested(&self.has_equipment));
        counts.insert("HAS_CAPABILITY".to_string(), nested(&self.has_capability));
        counts.insert("HAS_SPECIALTY".to_string(), nested(&self.has_specialty));
        counts.insert("LACKS".to_string(), nested(&self.lacks));
        counts.insert("COULD_SUPPORT".to_string(), nested(&self.could_support));
        counts.insert("DESERT_FOR".to_string(), nested(&self.desert_for));
        counts.insert("OPERATES_IN".to_string(), nested(&self.operates_in));
        counts
    }

    /// Canonical equipment keys a facility has claim edges for
    pub fn facility_equipment(&self, pk: &str) -> Vec<&str> {
        self.has_equipment
            .get(pk)
            .map(|targets| targets.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Canonical capability keys a facility claims
    pub fn facility_capabilities(&self, pk: &str) -> Vec<&str> {
        self.has_capability
            .get(pk)
            .map(|targets| targets.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Check structural invariants; violations abort the run
    pub fn validate(&self) -> Result<()> {
        for (pk, edge) in &self.located_in {
            if !self.facilities.contains_key(pk) {
                return Err(invariant(format!("LOCATED_IN from unknown facility '{}'", pk)));
            }
            if !self.regions.contains_key(&edge.region) {
                return Err(invariant(format!(
                    "LOCATED_IN to unknown region '{}'",
                    edge.region
                )));
            }
        }

        self.validate_claims(&self.has_equipment, &self.equipment, "HAS_EQUIPMENT")?;
        self.validate_claims(&self.has_capability, &self.capabilities, "HAS_CAPABILITY")?;
        self.validate_claims(&self.has_specialty, &self.specialties, "HAS_SPECIALTY")?;

        for (pk, targets) in &self.lacks {
            if !self.facilities.contains_key(pk) {
                return Err(invariant(format!("LACKS from unknown facility '{}'", pk)));
            }
            for (key, edge) in targets {
                if !self.equipment.contains_key(key) {
                    return Err(invariant(format!("LACKS to unknown equipment '{}'", key)));
                }
                if edge.required_by.is_empty() {
                    return Err(invariant(format!(
                        "LACKS edge {} → {} has empty required_by",
                        pk, key
                    )));
                }
                // A facility cannot both have and lack the same equipment
                if self
                    .has_equipment
                    .get(pk)
                    .map(|t| t.contains_key(key))
                    .unwrap_or(false)
                {
                    return Err(invariant(format!(
                        "Facility '{}' both has and lacks equipment '{}'",
                        pk, key
                    )));
                }
            }
        }

        for (pk, targets) in &self.could_support {
            if !self.facilities.contains_key(pk) {
                return Err(invariant(format!(
                    "COULD_SUPPORT from unknown facility '{}'",
                    pk
                )));
            }
            for (key, edge) in targets {
                if !self.capabilities.contains_key(key) {
                    return Err(invariant(format!(
                        "COULD_SUPPORT to unknown capability '{}'",
                        key
                    )));
                }
                if !(0.0..=1.0).contains(&edge.readiness) {
                    return Err(invariant(format!(
                        "COULD_SUPPORT {} → {} readiness {} out of range",
                        pk, key, edge.readiness
                    )));
                }
                // Mutual exclusion: a claimed capability never gets COULD_SUPPORT
                if self
                    .has_capability
                    .get(pk)
                    .map(|t| t.contains_key(key))
                    .unwrap_or(false)
                {
                    return Err(invariant(format!(
                        "Facility '{}' both claims and could-support capability '{}'",
                        pk, key
                    )));
                }
            }
        }

        for (region, targets) in &self.desert_for {
            if !self.regions.contains_key(region) {
                return Err(invariant(format!("DESERT_FOR from unknown region '{}'", region)));
            }
            for key in targets.keys() {
                if !self.specialties.contains_key(key) {
                    return Err(invariant(format!(
                        "DESERT_FOR to unknown specialty '{}'",
                        key
                    )));
                }
            }
        }

        for (pk, targets) in &self.operates_in {
            if !self.organizations.contains_key(pk) {
                return Err(invariant(format!(
                    "OPERATES_IN from unknown organization '{}'",
                    pk
                )));
            }
            for region in targets.keys() {
                if !self.regions.contains_key(region) {
                    return Err(invariant(format!(
                        "OPERATES_IN to unknown region '{}'",
                        region
                    )));
                }
            }
        }

        Ok(())
    }

    fn validate_claims<N>(
        &self,
        edges: &EdgeMap<ClaimEdge>,
        nodes: &BTreeMap<String, N>,
        kind: &str,
    ) -> Result<()> {
        for (pk, targets) in edges {
            if !self.facilities.contains_key(pk) {
                return Err(invariant(format!("{} from unknown facility '{}'", kind, pk)));
            }
            for (key, edge) in targets {
                if !nodes.contains_key(key) {
                    return Err(invariant(format!("{} to unknown node '{}'", kind, key)));
                }
                if edge.confidence < CONFIDENCE_FLOOR || edge.confidence > 1.0 {
                    return Err(invariant(format!(
                        "{} edge {} → {} confidence {} below floor or out of range",
                        kind, pk, key, edge.confidence
                    )));
                }
            }
        }
        Ok(())
    }
}

fn invariant(msg: String) -> Error {
    Error::Invariant(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_specialties() {
        assert_eq!(slugify("Ophthalmology"), "ophthalmology");
        assert_eq!(slugify("Ear, Nose & Throat"), "ear_nose_throat");
        assert_eq!(slugify("  OB/GYN  "), "ob_gyn");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn id_helpers_prefix_kind() {
        assert_eq!(facility_id("42"), "facility::42");
        assert_eq!(region_id("ashanti"), "region::ashanti");
        assert_eq!(specialty_id("ophthalmology"), "specialty::ophthalmology");
    }

    #[test]
    fn validate_rejects_dangling_edges() {
        let mut graph = KnowledgeGraph::default();
        graph.facilities.insert(
            "1".into(),
            FacilityNode {
                pk: "1".into(),
                name: "Clinic".into(),
                ..Default::default()
            },
        );
        graph.has_equipment.entry("1".into()).or_default().insert(
            "nonexistent_equipment".into(),
            ClaimEdge {
                confidence: 0.8,
                raw_text: "x".into(),
                source_field: "equipment".into(),
            },
        );
        assert!(matches!(graph.validate(), Err(Error::Invariant(_))));
    }

    #[test]
    fn validate_rejects_sub_floor_confidence() {
        let mut graph = KnowledgeGraph::default();
        graph.facilities.insert(
            "1".into(),
            FacilityNode {
                pk: "1".into(),
                name: "Clinic".into(),
                ..Default::default()
            },
        );
        graph.specialties.insert(
            "dentistry".into(),
            SpecialtyNode {
                key: "dentistry".into(),
                display_name: "Dentistry".into(),
            },
        );
        graph.has_specialty.entry("1".into()).or_default().insert(
            "dentistry".into(),
            ClaimEdge {
                confidence: 0.3,
                raw_text: "Dentistry".into(),
                source_field: "specialties".into(),
            },
        );
        assert!(matches!(graph.validate(), Err(Error::Invariant(_))));
    }

    #[test]
    fn empty_graph_is_valid() {
        assert!(KnowledgeGraph::default().validate().is_ok());
    }
}
