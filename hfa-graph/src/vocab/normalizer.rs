//! Normalization orchestrator
//!
//! Runs the full normalization stage over the deduplicated records:
//!
//! 1. keyword pass over the structured list fields (equipment, capability,
//!    procedure)
//! 2. description mining: scan the free-text fields for additional claims at
//!    reduced confidence
//! 3. cache lookup for phrases the keyword pass missed
//! 4. classifier dispatch for still-unknown phrases, batched and bounded,
//!    results appended to the cache
//!
//! A failed classifier batch leaves its phrases unmatched for this run and
//! uncached, so the next run retries them. Duplicate (facility, key) claims
//! collapse to the highest confidence.

use crate::ingest::SourceRecord;
use crate::vocab::cache::{CachedOutcome, NormalizationCache};
use crate::vocab::classifier::Classifier;
use crate::vocab::matcher::Matcher;
use crate::vocab::{
    tables, Domain, NormalizedClaim, BATCH_SIZE, CLASSIFIER_CONFIDENCE, KEYWORD_CONFIDENCE,
    MAX_IN_FLIGHT_BATCHES, SECONDARY_FIELD_CONFIDENCE,
};
use futures::stream::{self, StreamExt};
use hfa_common::Result;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Counters from one normalization run
#[derive(Debug, Default, Clone, serde::Serialize, serde::Deserialize)]
pub struct NormalizationStats {
    pub keyword_matches: usize,
    pub mined_claims: usize,
    pub cache_hits: usize,
    pub classifier_matches: usize,
    pub unmatched_phrases: usize,
    pub batches_dispatched: usize,
    pub batches_failed: usize,
}

/// Facility pk → normalized claims
pub type ClaimsByFacility = BTreeMap<String, Vec<NormalizedClaim>>;

pub struct Normalizer<'a> {
    equipment_matcher: Matcher,
    capability_matcher: Matcher,
    cache: &'a NormalizationCache,
    classifier: &'a dyn Classifier,
    vocab_version: String,
}

/// A phrase awaiting cache/classifier resolution, with every facility and
/// source field that produced it
#[derive(Clone)]
struct PendingPhrase {
    /// Original spelling, first seen
    raw: String,
    claimants: Vec<(String, String)>,
}

impl<'a> Normalizer<'a> {
    pub fn new(cache: &'a NormalizationCache, classifier: &'a dyn Classifier) -> Result<Self> {
        Ok(Normalizer {
            equipment_matcher: Matcher::new(Domain::Equipment)?,
            capability_matcher: Matcher::new(Domain::Capability)?,
            cache,
            classifier,
            vocab_version: tables::vocab_version(),
        })
    }

    fn matcher(&self, domain: Domain) -> &Matcher {
        match domain {
            Domain::Equipment => &self.equipment_matcher,
            Domain::Capability => &self.capability_matcher,
        }
    }

    /// Normalize every record; returns claims per facility plus counters
    pub async fn normalize(
        &self,
        records: &[SourceRecord],
    ) -> Result<(ClaimsByFacility, NormalizationStats)> {
        let mut claims = ClaimsByFacility::new();
        let mut stats = NormalizationStats::default();

        for domain in [Domain::Equipment, Domain::Capability] {
            self.normalize_domain(domain, records, &mut claims, &mut stats)
                .await?;
        }

        for facility_claims in claims.values_mut() {
            collapse_duplicates(facility_claims);
        }

        info!(
            facilities = claims.len(),
            keyword = stats.keyword_matches,
            mined = stats.mined_claims,
            cached = stats.cache_hits,
            classified = stats.classifier_matches,
            unmatched = stats.unmatched_phrases,
            "Normalized vocabulary claims"
        );
        Ok((claims, stats))
    }

    async fn normalize_domain(
        &self,
        domain: Domain,
        records: &[SourceRecord],
        claims: &mut ClaimsByFacility,
        stats: &mut NormalizationStats,
    ) -> Result<()> {
        let matcher = self.matcher(domain);
        let cached = self.cache.load_domain(&self.vocab_version, domain).await?;
        // lowercase phrase → pending entry, deterministic order
        let mut pending: BTreeMap<String, PendingPhrase> = BTreeMap::new();

        for record in records {
            for (phrase, source_field) in structured_phrases(record, domain) {
                let phrase = phrase.trim();
                if phrase.is_empty() {
                    continue;
                }

                if let Some(key) = matcher.match_phrase(phrase) {
                    push_claim(
                        claims,
                        &record.pk,
                        NormalizedClaim {
                            domain,
                            key: key.to_string(),
                            confidence: KEYWORD_CONFIDENCE,
                            raw_text: phrase.to_string(),
                            source_field: source_field.to_string(),
                        },
                    );
                    stats.keyword_matches += 1;
                    continue;
                }

                match cached.get(&phrase.to_lowercase()) {
                    Some(CachedOutcome::Match(key)) => {
                        push_claim(
                            claims,
                            &record.pk,
                            NormalizedClaim {
                                domain,
                                key: key.clone(),
                                confidence: CLASSIFIER_CONFIDENCE,
                                raw_text: phrase.to_string(),
                                source_field: source_field.to_string(),
                            },
                        );
                        stats.cache_hits += 1;
                    }
                    Some(CachedOutcome::NoMatch) => {
                        stats.cache_hits += 1;
                        stats.unmatched_phrases += 1;
                    }
                    None => {
                        pending
                            .entry(phrase.to_lowercase())
                            .or_insert_with(|| PendingPhrase {
                                raw: phrase.to_string(),
                                claimants: Vec::new(),
                            })
                            .claimants
                            .push((record.pk.clone(), source_field.to_string()));
                    }
                }
            }

            // Description mining: lower-confidence claims from free text
            for text in free_text_fields(record) {
                for key in matcher.scan_text(text) {
                    push_claim(
                        claims,
                        &record.pk,
                        NormalizedClaim {
                            domain,
                            key: key.to_string(),
                            confidence: SECONDARY_FIELD_CONFIDENCE,
                            raw_text: key.to_string(),
                            source_field: "description".to_string(),
                        },
                    );
                    stats.mined_claims += 1;
                }
            }
        }

        if pending.is_empty() {
            return Ok(());
        }

        self.classify_pending(domain, pending, claims, stats).await
    }

    /// Dispatch unknown phrases to the classifier in bounded batches
    async fn classify_pending(
        &self,
        domain: Domain,
        pending: BTreeMap<String, PendingPhrase>,
        claims: &mut ClaimsByFacility,
        stats: &mut NormalizationStats,
    ) -> Result<()> {
        let entries: Vec<(String, PendingPhrase)> = pending.into_iter().collect();
        let batches: Vec<Vec<(String, PendingPhrase)>> = entries
            .chunks(BATCH_SIZE)
            .map(|chunk| chunk.to_vec())
            .collect();
        stats.batches_dispatched += batches.len();

        let classifier = self.classifier;
        let mut results = stream::iter(batches.into_iter().map(|batch| async move {
            let phrases: Vec<String> =
                batch.iter().map(|(_, pending)| pending.raw.clone()).collect();
            let outcome = classifier.classify(domain, &phrases).await;
            (batch, outcome)
        }))
        .buffer_unordered(MAX_IN_FLIGHT_BATCHES);

        while let Some((batch, outcome)) = results.next().await {
            let keys = match outcome {
                Ok(keys) if keys.len() == batch.len() => keys,
                Ok(keys) => {
                    warn!(
                        domain = %domain,
                        expected = batch.len(),
                        got = keys.len(),
                        "Classifier batch length mismatch, leaving phrases unmatched"
                    );
                    stats.batches_failed += 1;
                    stats.unmatched_phrases +=
                        batch.iter().map(|(_, p)| p.claimants.len()).sum::<usize>();
                    continue;
                }
                Err(e) => {
                    warn!(domain = %domain, error = %e, "Classifier batch failed");
                    stats.batches_failed += 1;
                    stats.unmatched_phrases +=
                        batch.iter().map(|(_, p)| p.claimants.len()).sum::<usize>();
                    continue;
                }
            };

            for ((phrase_lower, pending), key) in batch.into_iter().zip(keys) {
                let outcome = match &key {
                    Some(key) => CachedOutcome::Match(key.clone()),
                    None => CachedOutcome::NoMatch,
                };
                self.cache
                    .put(&self.vocab_version, domain, &phrase_lower, &outcome)
                    .await?;

                match key {
                    Some(key) => {
                        for (pk, source_field) in pending.claimants {
                            push_claim(
                                claims,
                                &pk,
                                NormalizedClaim {
                                    domain,
                                    key: key.clone(),
                                    confidence: CLASSIFIER_CONFIDENCE,
                                    raw_text: pending.raw.clone(),
                                    source_field,
                                },
                            );
                            stats.classifier_matches += 1;
                        }
                    }
                    None => {
                        stats.unmatched_phrases += pending.claimants.len();
                    }
                }
            }
        }

        Ok(())
    }
}

/// Structured list fields feeding the phrase pipeline for a domain
fn structured_phrases(record: &SourceRecord, domain: Domain) -> Vec<(&str, &'static str)> {
    let mut phrases = Vec::new();
    match domain {
        Domain::Equipment => {
            for item in &record.equipment {
                phrases.push((item.as_str(), "equipment"));
            }
        }
        Domain::Capability => {
            for item in &record.capabilities {
                phrases.push((item.as_str(), "capability"));
            }
            for item in &record.procedures {
                phrases.push((item.as_str(), "procedure"));
            }
        }
    }
    phrases
}

/// Free-text fields mined with `scan_text`
fn free_text_fields(record: &SourceRecord) -> impl Iterator<Item = &str> {
    record
        .description
        .iter()
        .chain(record.mission_statement.iter())
        .chain(record.organization_description.iter())
        .map(String::as_str)
}

fn push_claim(claims: &mut ClaimsByFacility, pk: &str, claim: NormalizedClaim) {
    claims.entry(pk.to_string()).or_default().push(claim);
}

/// Keep the highest-confidence claim per (domain, key)
fn collapse_duplicates(claims: &mut Vec<NormalizedClaim>) {
    let mut best: BTreeMap<(Domain, String), NormalizedClaim> = BTreeMap::new();
    for claim in claims.drain(..) {
        let slot = (claim.domain, claim.key.clone());
        match best.get(&slot) {
            Some(existing) if existing.confidence >= claim.confidence => {}
            _ => {
                best.insert(slot, claim);
            }
        }
    }
    claims.extend(best.into_values());
}
