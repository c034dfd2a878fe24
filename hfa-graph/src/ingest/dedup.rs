//! Deduplication of multi-source records
//!
//! The same real-world entity can appear in several scraped sources, always
//! under the same `pk_unique_id`. Merging groups rows by that identifier and
//! folds each group into one record:
//!
//! - scalar fields take the first non-null value in input order
//! - list fields take the case-insensitive union, preserving first appearance
//! - `source_urls` accumulates every distinct source
//! - a resolved region is preferred over an unresolved one
//!
//! Merging is idempotent: feeding merged output back through produces the
//! same records.

use crate::ingest::SourceRecord;
use std::collections::BTreeMap;
use tracing::info;

/// Merge records sharing a `pk_unique_id`; output is ordered by identifier
pub fn merge_duplicates(records: Vec<SourceRecord>) -> Vec<SourceRecord> {
    let input_count = records.len();
    let mut merged: BTreeMap<String, SourceRecord> = BTreeMap::new();

    for record in records {
        match merged.remove(&record.pk) {
            None => {
                merged.insert(record.pk.clone(), record);
            }
            Some(existing) => {
                let combined = merge_pair(existing, record);
                merged.insert(combined.pk.clone(), combined);
            }
        }
    }

    let output: Vec<SourceRecord> = merged.into_values().collect();
    info!(
        input = input_count,
        output = output.len(),
        merged = input_count - output.len(),
        "Merged duplicate records"
    );
    output
}

/// Fold `incoming` into `base`; `base` appeared first in input order
fn merge_pair(mut base: SourceRecord, incoming: SourceRecord) -> SourceRecord {
    fn first_non_null<T>(a: Option<T>, b: Option<T>) -> Option<T> {
        a.or(b)
    }

    base.organization_type = first_non_null(base.organization_type, incoming.organization_type);
    base.facility_type = first_non_null(base.facility_type, incoming.facility_type);
    base.operator_type = first_non_null(base.operator_type, incoming.operator_type);
    base.capacity = first_non_null(base.capacity, incoming.capacity);
    base.number_doctors = first_non_null(base.number_doctors, incoming.number_doctors);
    base.area = first_non_null(base.area, incoming.area);
    base.year_established = first_non_null(base.year_established, incoming.year_established);
    base.city = first_non_null(base.city, incoming.city);
    base.raw_region = first_non_null(base.raw_region, incoming.raw_region);
    base.email = first_non_null(base.email, incoming.email);
    base.description = first_non_null(base.description, incoming.description);
    base.mission_statement = first_non_null(base.mission_statement, incoming.mission_statement);
    base.organization_description = first_non_null(
        base.organization_description,
        incoming.organization_description,
    );
    base.lat = first_non_null(base.lat, incoming.lat);
    base.lng = first_non_null(base.lng, incoming.lng);
    base.resolved_region = first_non_null(base.resolved_region, incoming.resolved_region);

    union_into(&mut base.specialties, incoming.specialties);
    union_into(&mut base.procedures, incoming.procedures);
    union_into(&mut base.equipment, incoming.equipment);
    union_into(&mut base.capabilities, incoming.capabilities);
    union_into(&mut base.phone_numbers, incoming.phone_numbers);
    union_into(&mut base.websites, incoming.websites);
    union_into(&mut base.countries, incoming.countries);
    union_into(&mut base.source_urls, incoming.source_urls);
    union_into(&mut base.quality_flags, incoming.quality_flags);

    base
}

/// Append items not already present case-insensitively, keeping first spelling
fn union_into(target: &mut Vec<String>, incoming: Vec<String>) {
    for item in incoming {
        let exists = target.iter().any(|t| t.eq_ignore_ascii_case(&item));
        if !exists {
            target.push(item);
        }
    }
}
