//! Vocabulary normalization
//!
//! Maps free-text equipment/capability phrases onto the canonical vocabulary
//! in two passes: a deterministic keyword pass ([`matcher`]) and a cached
//! classification callback ([`classifier`]) for whatever the keyword pass
//! misses. Classification results persist across runs in a SQLite cache
//! ([`cache`]) keyed by vocabulary version, so each distinct phrase is
//! classified at most once per vocabulary revision.

pub mod cache;
pub mod classifier;
pub mod matcher;
pub mod normalizer;
pub mod tables;

use serde::{Deserialize, Serialize};

/// Confidence assigned to keyword matches on primary structured fields
pub const KEYWORD_CONFIDENCE: f64 = 0.8;
/// Confidence assigned to keyword matches mined from secondary free-text
/// fields (descriptions, mission statements)
pub const SECONDARY_FIELD_CONFIDENCE: f64 = 0.7;
/// Confidence assigned to classifier matches
pub const CLASSIFIER_CONFIDENCE: f64 = 0.6;
/// Confidence assigned to structured specialty claims
pub const SPECIALTY_CONFIDENCE: f64 = 0.9;

/// Phrases per classification request
pub const BATCH_SIZE: usize = 20;
/// Concurrent classification requests in flight
pub const MAX_IN_FLIGHT_BATCHES: usize = 4;

/// Vocabulary domain a phrase is normalized against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Equipment,
    Capability,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Equipment => "equipment",
            Domain::Capability => "capability",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized claim attributed to a facility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedClaim {
    pub domain: Domain,
    /// Canonical vocabulary key
    pub key: String,
    pub confidence: f64,
    /// Raw phrase the claim was derived from
    pub raw_text: String,
    /// Source column or field the phrase came from
    pub source_field: String,
}
