//! Base graph construction
//!
//! Seeds region nodes from the country configuration and equipment and
//! capability nodes from the canonical vocabularies, then walks the
//! deduplicated records: NGO rows become organization nodes with OPERATES_IN
//! edges, everything else becomes a facility node with LOCATED_IN and HAS_*
//! edges. Claim edges below the confidence floor are dropped. Specialty
//! nodes are created on first sight from the slugified raw strings.

use crate::graph::schema::{
    slugify, ClaimEdge, CapabilityNode, EquipmentNode, FacilityNode, KnowledgeGraph,
    LocatedInEdge, OperatesInEdge, OrganizationNode, RegionNode, SpecialtyNode,
    CONFIDENCE_FLOOR,
};
use crate::ingest::SourceRecord;
use crate::vocab::normalizer::ClaimsByFacility;
use crate::vocab::tables::{self, Complexity};
use crate::vocab::{Domain, SPECIALTY_CONFIDENCE};
use hfa_common::CountryConfig;
use tracing::info;

/// Build the base graph from deduplicated records and normalized claims
pub fn build_graph(
    records: &[SourceRecord],
    config: &CountryConfig,
    claims: &ClaimsByFacility,
) -> KnowledgeGraph {
    let mut graph = KnowledgeGraph::default();

    for (key, region) in &config.regions {
        graph.regions.insert(
            key.clone(),
            RegionNode {
                key: key.clone(),
                name: region.display_name.clone(),
                population: region.population,
                capital: region.capital.clone(),
                lat: region.lat,
                lng: region.lng,
            },
        );
    }

    for entry in tables::entries(Domain::Equipment) {
        graph.equipment.insert(
            entry.key.to_string(),
            EquipmentNode {
                key: entry.key.to_string(),
                display_name: entry.display.to_string(),
                category: entry.category.to_string(),
            },
        );
    }

    for entry in tables::entries(Domain::Capability) {
        graph.capabilities.insert(
            entry.key.to_string(),
            CapabilityNode {
                key: entry.key.to_string(),
                display_name: entry.display.to_string(),
                category: entry.category.to_string(),
                complexity: entry.complexity.unwrap_or(Complexity::Medium),
            },
        );
    }

    let mut facility_count = 0usize;
    let mut organization_count = 0usize;

    for record in records {
        if record.is_ngo() {
            add_organization(&mut graph, record);
            organization_count += 1;
        } else {
            add_facility(&mut graph, record, claims);
            facility_count += 1;
        }
    }

    info!(
        regions = graph.regions.len(),
        facilities = facility_count,
        organizations = organization_count,
        specialties = graph.specialties.len(),
        "Built base graph"
    );
    graph
}

fn add_facility(graph: &mut KnowledgeGraph, record: &SourceRecord, claims: &ClaimsByFacility) {
    let pk = record.pk.clone();

    graph.facilities.insert(
        pk.clone(),
        FacilityNode {
            pk: pk.clone(),
            name: record.name.clone(),
            facility_type: record.facility_type.clone(),
            operator_type: record.operator_type.clone(),
            capacity: record.capacity,
            number_doctors: record.number_doctors,
            area: record.area,
            year_established: record.year_established,
            city: record.city.clone(),
            region: record.resolved_region.clone(),
            source_count: record.source_count(),
            email: record.email.clone(),
            phone_numbers: record.phone_numbers.clone(),
            websites: record.websites.clone(),
            description: record.description.clone(),
            raw_procedures: record.procedures.clone(),
            raw_equipment: record.equipment.clone(),
            raw_capabilities: record.capabilities.clone(),
            quality_flags: record.quality_flags.clone(),
        },
    );

    if let Some(region) = &record.resolved_region {
        if graph.regions.contains_key(region) {
            graph.located_in.insert(
                pk.clone(),
                LocatedInEdge {
                    region: region.clone(),
                    city: record.city.clone(),
                },
            );
        }
    }

    // Structured specialties: closed slug vocabulary, high confidence
    for raw in &record.specialties {
        let slug = slugify(raw);
        if slug.is_empty() {
            continue;
        }
        graph
            .specialties
            .entry(slug.clone())
            .or_insert_with(|| SpecialtyNode {
                key: slug.clone(),
                display_name: raw.clone(),
            });
        insert_claim(
            graph.has_specialty.entry(pk.clone()).or_default(),
            slug,
            ClaimEdge {
                confidence: SPECIALTY_CONFIDENCE,
                raw_text: raw.clone(),
                source_field: "specialties".to_string(),
            },
        );
    }

    // Normalized equipment/capability claims, floor applied here
    if let Some(facility_claims) = claims.get(&pk) {
        for claim in facility_claims {
            if claim.confidence < CONFIDENCE_FLOOR {
                continue;
            }
            let edge = ClaimEdge {
                confidence: claim.confidence,
                raw_text: claim.raw_text.clone(),
                source_field: claim.source_field.clone(),
            };
            match claim.domain {
                Domain::Equipment => insert_claim(
                    graph.has_equipment.entry(pk.clone()).or_default(),
                    claim.key.clone(),
                    edge,
                ),
                Domain::Capability => insert_claim(
                    graph.has_capability.entry(pk.clone()).or_default(),
                    claim.key.clone(),
                    edge,
                ),
            }
        }
    }
}

fn add_organization(graph: &mut KnowledgeGraph, record: &SourceRecord) {
    let pk = record.pk.clone();

    graph.organizations.insert(
        pk.clone(),
        OrganizationNode {
            pk: pk.clone(),
            name: record.name.clone(),
            countries: record.countries.clone(),
            mission_summary: record.mission_statement.clone(),
            description: record
                .organization_description
                .clone()
                .or_else(|| record.description.clone()),
            email: record.email.clone(),
            phone_numbers: record.phone_numbers.clone(),
            websites: record.websites.clone(),
            source_count: record.source_count(),
        },
    );

    if let Some(region) = &record.resolved_region {
        if graph.regions.contains_key(region) {
            graph.operates_in.entry(pk).or_default().insert(
                region.clone(),
                OperatesInEdge {
                    source: "address".to_string(),
                },
            );
        }
    }
}

/// Insert a claim edge, keeping the higher confidence on collision
fn insert_claim(
    targets: &mut std::collections::BTreeMap<String, ClaimEdge>,
    key: String,
    edge: ClaimEdge,
) {
    match targets.get(&key) {
        Some(existing) if existing.confidence >= edge.confidence => {}
        _ => {
            targets.insert(key, edge);
        }
    }
}
