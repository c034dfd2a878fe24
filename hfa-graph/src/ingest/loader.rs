//! CSV record loading and cleaning
//!
//! The input is a row-oriented CSV where list-valued fields are JSON-encoded
//! strings. Loading decodes the list columns (malformed JSON degrades the
//! field to empty, flagged on the record), coerces numeric columns, and
//! excludes rows with a missing identifier or an unparsable non-null numeric
//! value. Excluded rows are counted per reason, never silently dropped.

use hfa_common::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{info, warn};

/// JSON-encoded list columns in the source CSV
pub const JSON_LIST_COLUMNS: &[&str] = &[
    "specialties",
    "procedure",
    "equipment",
    "capability",
    "phone_numbers",
    "websites",
    "countries",
];

/// One cleaned source row
///
/// Raw free-text list fields (`procedures`, `equipment`, `capabilities`) are
/// retained verbatim on the record so unmatched phrases stay available for
/// downstream free-text search even when they contribute no structured edge.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SourceRecord {
    /// Stable per-entity identifier (`pk_unique_id` column)
    pub pk: String,
    pub name: String,
    pub organization_type: Option<String>,
    pub facility_type: Option<String>,
    pub operator_type: Option<String>,
    pub capacity: Option<i64>,
    pub number_doctors: Option<i64>,
    pub area: Option<f64>,
    pub year_established: Option<i64>,
    pub city: Option<String>,
    pub raw_region: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub mission_statement: Option<String>,
    pub organization_description: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub specialties: Vec<String>,
    pub procedures: Vec<String>,
    pub equipment: Vec<String>,
    pub capabilities: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub websites: Vec<String>,
    pub countries: Vec<String>,
    /// Distinct source URLs this record was merged from
    pub source_urls: Vec<String>,
    /// Data-quality flags accumulated during cleaning (e.g. json_parse_error_equipment)
    pub quality_flags: Vec<String>,
    /// Canonical region key, set by the region resolver
    pub resolved_region: Option<String>,
}

impl SourceRecord {
    /// Number of distinct sources this record was observed in
    pub fn source_count(&self) -> u32 {
        self.source_urls.len().max(1) as u32
    }

    /// True when the row describes an NGO rather than a facility
    pub fn is_ngo(&self) -> bool {
        self.organization_type
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case("ngo"))
            .unwrap_or(false)
    }
}

/// Result of loading one CSV file
#[derive(Debug, Default)]
pub struct LoadReport {
    pub records: Vec<SourceRecord>,
    /// Count of excluded rows per reason
    pub excluded: BTreeMap<String, usize>,
    /// Count of JSON list fields degraded to empty
    pub json_field_errors: usize,
}

impl LoadReport {
    pub fn rows_excluded(&self) -> usize {
        self.excluded.values().sum()
    }
}

/// Load the CSV and clean each row
pub fn load_csv(csv_path: &Path) -> Result<LoadReport> {
    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut report = LoadReport::default();

    for (index, row) in reader.deserialize::<HashMap<String, String>>().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!(row = index + 1, error = %e, "Excluding malformed CSV row");
                *report.excluded.entry("csv_parse_error".into()).or_default() += 1;
                continue;
            }
        };

        match clean_row(&row, &mut report.json_field_errors) {
            Ok(record) => report.records.push(record),
            Err(reason) => {
                warn!(row = index + 1, reason = %reason, "Excluding row");
                *report.excluded.entry(reason).or_default() += 1;
            }
        }
    }

    info!(
        path = %csv_path.display(),
        rows = report.records.len(),
        excluded = report.rows_excluded(),
        "Loaded CSV"
    );
    Ok(report)
}

/// Clean one raw row; returns the exclusion reason on failure
fn clean_row(
    row: &HashMap<String, String>,
    json_field_errors: &mut usize,
) -> std::result::Result<SourceRecord, String> {
    let pk = match scalar(row, "pk_unique_id") {
        Some(pk) => pk,
        None => return Err("missing_pk_unique_id".into()),
    };

    let mut quality_flags = Vec::new();
    let mut list_field = |field: &str| -> Vec<String> {
        match parse_json_list(row.get(field).map(String::as_str)) {
            Ok(items) => items,
            Err(()) => {
                *json_field_errors += 1;
                quality_flags.push(format!("json_parse_error_{}", field));
                Vec::new()
            }
        }
    };

    let specialties = list_field("specialties");
    let procedures = list_field("procedure");
    let equipment = list_field("equipment");
    let capabilities = list_field("capability");
    let phone_numbers = list_field("phone_numbers");
    let websites = list_field("websites");
    let countries = list_field("countries");

    let record = SourceRecord {
        pk,
        name: scalar(row, "name").unwrap_or_else(|| "Unknown".to_string()),
        organization_type: scalar(row, "organization_type"),
        facility_type: scalar(row, "facilityTypeId"),
        operator_type: scalar(row, "operatorTypeId"),
        capacity: parse_int(row, "capacity").map_err(|r| r.to_string())?,
        number_doctors: parse_int(row, "numberDoctors").map_err(|r| r.to_string())?,
        area: parse_float(row, "area").map_err(|r| r.to_string())?,
        year_established: parse_int(row, "yearEstablished").map_err(|r| r.to_string())?,
        city: scalar(row, "address_city"),
        raw_region: scalar(row, "address_stateOrRegion"),
        email: scalar(row, "email"),
        description: scalar(row, "description"),
        mission_statement: scalar(row, "missionStatement"),
        organization_description: scalar(row, "organizationDescription"),
        lat: parse_float(row, "lat").map_err(|r| r.to_string())?,
        lng: parse_float(row, "lng").map_err(|r| r.to_string())?,
        specialties,
        procedures,
        equipment,
        capabilities,
        phone_numbers,
        websites,
        countries,
        source_urls: scalar(row, "source_url").into_iter().collect(),
        quality_flags,
        resolved_region: None,
    };

    Ok(record)
}

/// Fetch a scalar column, mapping ""/"null"/"none" to None
fn scalar(row: &HashMap<String, String>, field: &str) -> Option<String> {
    let value = row.get(field)?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("null") || value.eq_ignore_ascii_case("none")
    {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse a JSON-encoded list column; Err(()) marks malformed JSON
fn parse_json_list(value: Option<&str>) -> std::result::Result<Vec<String>, ()> {
    let text = match value {
        Some(v) => v.trim(),
        None => return Ok(Vec::new()),
    };
    if text.is_empty()
        || text.eq_ignore_ascii_case("null")
        || text.eq_ignore_ascii_case("none")
        || text == "[]"
    {
        return Ok(Vec::new());
    }
    let parsed: serde_json::Value = serde_json::from_str(text).map_err(|_| ())?;
    let items = match parsed {
        serde_json::Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
        .collect())
}

/// Coerce a numeric column to i64 ("12.0" parses as 12); a non-null
/// unparsable value excludes the row
fn parse_int(row: &HashMap<String, String>, field: &str) -> std::result::Result<Option<i64>, String> {
    match scalar(row, field) {
        None => Ok(None),
        Some(text) => text
            .parse::<f64>()
            .map(|f| Some(f as i64))
            .map_err(|_| format!("unparsable_{}", field)),
    }
}

fn parse_float(
    row: &HashMap<String, String>,
    field: &str,
) -> std::result::Result<Option<f64>, String> {
    match scalar(row, field) {
        None => Ok(None),
        Some(text) => text
            .parse::<f64>()
            .map(Some)
            .map_err(|_| format!("unparsable_{}", field)),
    }
}
