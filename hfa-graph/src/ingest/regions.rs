//! Region resolution
//!
//! Maps each record's free-text location fields to a canonical region key
//! from the country configuration. Resolution is two-tier: the raw
//! `address_stateOrRegion` value is checked against the alias table first,
//! then the city is checked against the city table. Records that match
//! neither stay unresolved and are kept; they simply attach to no region.

use crate::ingest::SourceRecord;
use hfa_common::CountryConfig;
use tracing::{debug, info};

/// Outcome counts for one resolution pass
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Resolved via the raw region alias table
    pub by_region_alias: usize,
    /// Resolved via the city fallback table
    pub by_city: usize,
    /// Left unresolved
    pub unresolved: usize,
}

/// Resolve `resolved_region` on every record in place
pub fn resolve_regions(records: &mut [SourceRecord], config: &CountryConfig) -> ResolutionReport {
    let mut report = ResolutionReport::default();

    for record in records.iter_mut() {
        let from_alias = record
            .raw_region
            .as_deref()
            .and_then(|raw| config.normalize_region(raw));

        if let Some(region) = from_alias {
            record.resolved_region = Some(region.to_string());
            report.by_region_alias += 1;
            continue;
        }

        let from_city = record
            .city
            .as_deref()
            .and_then(|city| config.region_for_city(city));

        if let Some(region) = from_city {
            record.resolved_region = Some(region.to_string());
            report.by_city += 1;
            continue;
        }

        debug!(
            pk = %record.pk,
            raw_region = record.raw_region.as_deref().unwrap_or(""),
            city = record.city.as_deref().unwrap_or(""),
            "Region unresolved"
        );
        report.unresolved += 1;
    }

    info!(
        by_region_alias = report.by_region_alias,
        by_city = report.by_city,
        unresolved = report.unresolved,
        "Resolved regions"
    );
    report
}
