//! LACKS and COULD_SUPPORT inference
//!
//! LACKS: a facility claims a capability but shows no evidence of equipment
//! the requirements table marks as required. One edge per missing equipment,
//! accumulating every claimed capability that requires it.
//!
//! COULD_SUPPORT: a facility does not claim a capability but already owns at
//! least `MIN_READINESS` of its required equipment. Claimed capabilities are
//! never candidates, which keeps LACKS and COULD_SUPPORT mutually exclusive
//! per (facility, capability).

use crate::graph::requirements::CAPABILITY_REQUIREMENTS;
use crate::graph::schema::{CouldSupportEdge, KnowledgeGraph, LacksEdge};
use std::collections::BTreeSet;
use tracing::info;

/// Minimum fraction of required equipment for a COULD_SUPPORT edge
pub const MIN_READINESS: f64 = 0.6;

/// Add LACKS edges; returns the number added
pub fn add_lacks_edges(graph: &mut KnowledgeGraph) -> usize {
    let mut count = 0usize;
    let facility_pks: Vec<String> = graph.facilities.keys().cloned().collect();

    for pk in facility_pks {
        let owned: BTreeSet<String> = graph
            .facility_equipment(&pk)
            .into_iter()
            .map(String::from)
            .collect();
        let claimed: Vec<String> = graph
            .facility_capabilities(&pk)
            .into_iter()
            .map(String::from)
            .collect();

        for cap_key in &claimed {
            let Some(reqs) = crate::graph::requirements::requirements_for(cap_key) else {
                continue;
            };

            for equipment_key in reqs.required {
                if owned.contains(*equipment_key) {
                    continue;
                }
                if !graph.equipment.contains_key(*equipment_key) {
                    continue;
                }

                let targets = graph.lacks.entry(pk.clone()).or_default();
                match targets.get_mut(*equipment_key) {
                    Some(edge) => {
                        if !edge.required_by.contains(cap_key) {
                            edge.required_by.push(cap_key.clone());
                        }
                    }
                    None => {
                        targets.insert(
                            equipment_key.to_string(),
                            LacksEdge {
                                required_by: vec![cap_key.clone()],
                                evidence_status: "no_evidence".to_string(),
                            },
                        );
                        count += 1;
                    }
                }
            }
        }
    }

    info!(edges = count, "Added LACKS edges");
    count
}

/// Add COULD_SUPPORT edges; returns the number added
pub fn add_could_support_edges(graph: &mut KnowledgeGraph) -> usize {
    let mut count = 0usize;
    let facility_pks: Vec<String> = graph.facilities.keys().cloned().collect();

    for pk in facility_pks {
        let owned: BTreeSet<String> = graph
            .facility_equipment(&pk)
            .into_iter()
            .map(String::from)
            .collect();
        if owned.is_empty() {
            continue;
        }
        let claimed: BTreeSet<String> = graph
            .facility_capabilities(&pk)
            .into_iter()
            .map(String::from)
            .collect();

        for reqs in CAPABILITY_REQUIREMENTS {
            if claimed.contains(reqs.capability) {
                continue;
            }
            if reqs.required.is_empty() {
                continue;
            }
            if !graph.capabilities.contains_key(reqs.capability) {
                continue;
            }

            let existing: Vec<String> = reqs
                .required
                .iter()
                .filter(|eq| owned.contains(**eq))
                .map(|eq| eq.to_string())
                .collect();
            let readiness = existing.len() as f64 / reqs.required.len() as f64;
            if readiness < MIN_READINESS {
                continue;
            }

            let missing: Vec<String> = reqs
                .required
                .iter()
                .filter(|eq| !owned.contains(**eq))
                .map(|eq| eq.to_string())
                .collect();

            graph.could_support.entry(pk.clone()).or_default().insert(
                reqs.capability.to_string(),
                CouldSupportEdge {
                    readiness: (readiness * 100.0).round() / 100.0,
                    existing_equipment: existing,
                    missing_equipment: missing,
                },
            );
            count += 1;
        }
    }

    info!(edges = count, "Added COULD_SUPPORT edges");
    count
}
