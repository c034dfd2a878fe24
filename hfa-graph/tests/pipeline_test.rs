//! End-to-end pipeline tests
//!
//! Drive the full CSV → graph → snapshot path with the offline classifier
//! and an in-memory cache. Fixtures model a three-region chain country so
//! desert detection and adjacency search have something to traverse.

use hfa_common::CountryConfig;
use hfa_graph::graph::export::{export_snapshot, load_snapshot};
use hfa_graph::vocab::cache::NormalizationCache;
use hfa_graph::vocab::classifier::NoopClassifier;
use hfa_graph::{run_pipeline, PipelineOptions, PipelineOutput};
use std::io::Write;
use tempfile::NamedTempFile;

/// Chain country: a (500k) - b (200k) - c (100k)
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

[region_aliases]
"a region" = "a"
"b region" = "b"
"c region" = "c"

[city_regions]
"a town" = "a"
"#;
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    CountryConfig::load(file.path()).unwrap()
}

const CSV_HEADER: &str = "pk_unique_id,name,organization_type,address_city,\
                          address_stateOrRegion,specialties,procedure,equipment,\
                          capability,description,source_url";

fn write_csv(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", CSV_HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file.flush().unwrap();
    file
}

async fn run(csv: &NamedTempFile, options: &PipelineOptions) -> PipelineOutput {
    let config = chain_config();
    let cache = NormalizationCache::open_in_memory().await.unwrap();
    run_pipeline(csv.path(), &config, &cache, &NoopClassifier, options)
        .await
        .unwrap()
}

#[tokio::test]
async fn end_to_end_builds_graph() {
    let csv = write_csv(&[
        r#"1,Alpha Eye Clinic,,A Town,A Region,"[""Ophthalmology""]",,"[""operating theatre""]","[""cataract surgery""]",,http://src.example/alpha"#,
        r#"2,Beta General,,B Town,B Region,,,"[""x-ray machine"", ""laboratory""]",,,http://src.example/beta"#,
    ]);
    let output = run(&csv, &PipelineOptions::default()).await;

    let graph = &output.graph;
    assert_eq!(graph.facilities.len(), 2);
    assert_eq!(graph.regions.len(), 3);
    assert_eq!(graph.facilities["1"].region.as_deref(), Some("a"));
    assert_eq!(graph.facilities["2"].region.as_deref(), Some("b"));
    assert!(graph.located_in.contains_key("1"));

    assert!(graph.has_capability["1"].contains_key("cataract_surgery"));
    assert!(graph.has_equipment["1"].contains_key("operating_theatre"));
    assert!(graph.has_equipment["2"].contains_key("xray_machine"));
    assert!(graph.has_specialty["1"].contains_key("ophthalmology"));

    assert_eq!(output.stats.rows_loaded, 2);
    assert_eq!(output.stats.records_after_dedup, 2);
    assert_eq!(output.stats.unresolved_regions, 0);
    assert!(output.stats.normalization.keyword_matches >= 4);
    assert_eq!(output.dataset_id.len(), 64);
}

#[tokio::test]
async fn repeated_runs_produce_identical_graphs() {
    let csv = write_csv(&[
        r#"1,Alpha Eye Clinic,,A Town,A Region,"[""Ophthalmology""]",,"[""operating theatre"", ""autoclave""]","[""cataract surgery""]",,http://src.example/alpha"#,
        r#"2,Beta General,,B Town,B Region,"[""Dentistry""]",,"[""dental chair""]",,,http://src.example/beta"#,
        r#"3,Gamma Clinic,,C Town,C Region,,,"[""ultrasound""]",,,http://src.example/gamma"#,
    ]);

    let first = run(&csv, &PipelineOptions::default()).await;
    let second = run(&csv, &PipelineOptions::default()).await;

    assert_eq!(first.dataset_id, second.dataset_id);
    assert_eq!(
        serde_json::to_string(&first.graph).unwrap(),
        serde_json::to_string(&second.graph).unwrap()
    );
}

#[tokio::test]
async fn duplicate_identifiers_merge_into_one_facility() {
    let csv = write_csv(&[
        r#"1,Alpha Eye Clinic,,A Town,A Region,,,"[""operating theatre""]",,,http://src.example/page1"#,
        r#"1,Alpha Eye Clinic,,A Town,A Region,,,"[""autoclave""]",,,http://src.example/page2"#,
    ]);
    let output = run(&csv, &PipelineOptions::default()).await;

    assert_eq!(output.stats.rows_loaded, 2);
    assert_eq!(output.stats.records_after_dedup, 1);
    assert_eq!(output.graph.facilities.len(), 1);
    assert_eq!(output.graph.facilities["1"].source_count, 2);

    let equipment = output.graph.facility_equipment("1");
    assert!(equipment.contains(&"operating_theatre"));
    assert!(equipment.contains(&"autoclave"));
}

#[tokio::test]
async fn claimed_capability_without_equipment_yields_lacks() {
    // Cataract surgery requires four items; only the theatre is present
    let csv = write_csv(&[
        r#"1,Alpha Eye Clinic,,A Town,A Region,,,"[""operating theatre""]","[""cataract surgery""]",,http://src.example/alpha"#,
    ]);
    let output = run(&csv, &PipelineOptions::default()).await;

    let lacks = &output.graph.lacks["1"];
    assert_eq!(lacks.len(), 3);
    for key in ["operating_microscope", "autoclave", "anesthesia_machine"] {
        let edge = &lacks[key];
        assert_eq!(edge.required_by, vec!["cataract_surgery".to_string()]);
        assert_eq!(edge.evidence_status, "no_evidence");
    }
    assert!(!lacks.contains_key("operating_theatre"));
    assert_eq!(output.stats.lacks_edges, 3);
}

#[tokio::test]
async fn equipped_facility_could_support_unclaimed_capability() {
    // Facility 1 owns 3 of 4 required items and never claims the capability;
    // facility 2 owns only 2 of 4
    let csv = write_csv(&[
        r#"1,Alpha Surgical,,A Town,A Region,,,"[""operating theatre"", ""operating microscope"", ""autoclave""]",,,http://src.example/alpha"#,
        r#"2,Beta General,,B Town,B Region,,,"[""operating theatre"", ""autoclave""]",,,http://src.example/beta"#,
    ]);
    let output = run(&csv, &PipelineOptions::default()).await;

    let edge = &output.graph.could_support["1"]["cataract_surgery"];
    assert_eq!(edge.readiness, 0.75);
    assert_eq!(edge.missing_equipment, vec!["anesthesia_machine".to_string()]);
    assert_eq!(edge.existing_equipment.len(), 3);

    let below_threshold = output
        .graph
        .could_support
        .get("2")
        .map(|t| t.contains_key("cataract_surgery"))
        .unwrap_or(false);
    assert!(!below_threshold);
}

#[tokio::test]
async fn claimed_capabilities_never_get_could_support() {
    let csv = write_csv(&[
        r#"1,Alpha Surgical,,A Town,A Region,,,"[""operating theatre"", ""operating microscope"", ""autoclave"", ""anesthesia machine""]","[""cataract surgery""]",,http://src.example/alpha"#,
    ]);
    let output = run(&csv, &PipelineOptions::default()).await;

    assert!(output.graph.has_capability["1"].contains_key("cataract_surgery"));
    // The fully-equipped facility may earn COULD_SUPPORT for other unclaimed
    // capabilities, but never for the one it already claims
    if let Some(targets) = output.graph.could_support.get("1") {
        assert!(!targets.contains_key("cataract_surgery"));
    }
    assert!(output.graph.lacks.get("1").is_none());
    output.graph.validate().unwrap();
}

#[tokio::test]
async fn uncovered_regions_become_deserts() {
    // Ophthalmology exists only in region c
    let csv = write_csv(&[
        r#"1,Gamma Eye Clinic,,C Town,C Region,"[""Ophthalmology""]",,,,,http://src.example/gamma"#,
    ]);
    let output = run(&csv, &PipelineOptions::default()).await;

    let a_edge = &output.graph.desert_for["a"]["ophthalmology"];
    assert_eq!(a_edge.facility_count, 0);
    assert_eq!(a_edge.population, 500000);
    assert_eq!(a_edge.severity, 500000.0);
    assert_eq!(a_edge.nearest_region.as_deref(), Some("c"));

    let b_edge = &output.graph.desert_for["b"]["ophthalmology"];
    assert_eq!(b_edge.nearest_region.as_deref(), Some("c"));
    assert!(b_edge.severity < a_edge.severity);

    assert!(output.graph.desert_for.get("c").is_none());
    assert_eq!(output.stats.desert_edges, 2);
}

#[tokio::test]
async fn skip_flags_suppress_derived_edges() {
    let csv = write_csv(&[
        r#"1,Alpha Eye Clinic,,A Town,A Region,"[""Ophthalmology""]",,"[""operating theatre""]","[""cataract surgery""]",,http://src.example/alpha"#,
    ]);
    let options = PipelineOptions {
        skip_inference: true,
        skip_deserts: true,
    };
    let output = run(&csv, &options).await;

    assert!(output.graph.lacks.is_empty());
    assert!(output.graph.could_support.is_empty());
    assert!(output.graph.desert_for.is_empty());
    assert_eq!(output.stats.lacks_edges, 0);
    assert_eq!(output.stats.desert_edges, 0);
    // Claims are still built
    assert!(output.graph.has_capability["1"].contains_key("cataract_surgery"));
}

#[tokio::test]
async fn unresolvable_regions_are_kept_and_counted() {
    let csv = write_csv(&[
        r#"1,Nowhere Clinic,,Nowhere Town,Atlantis,,,"[""laboratory""]",,,http://src.example/nowhere"#,
    ]);
    let output = run(&csv, &PipelineOptions::default()).await;

    assert_eq!(output.stats.unresolved_regions, 1);
    let facility = &output.graph.facilities["1"];
    assert!(facility.region.is_none());
    assert!(!output.graph.located_in.contains_key("1"));
    // Claims survive region-resolution failure
    assert!(output.graph.has_equipment["1"].contains_key("laboratory"));
}

#[tokio::test]
async fn region_resolved_on_any_source_row_resolves_the_entity() {
    // Same entity from two sources: one row has a junk region, the other
    // resolves. The merged record carries the region and is not counted
    // as unresolved.
    let csv = write_csv(&[
        r#"1,Alpha Eye Clinic,,Unknown Town,Atlantis,,,"[""operating theatre""]",,,http://src.example/page1"#,
        r#"1,Alpha Eye Clinic,,A Town,A Region,,,,,,http://src.example/page2"#,
    ]);
    let output = run(&csv, &PipelineOptions::default()).await;

    assert_eq!(output.stats.records_after_dedup, 1);
    assert_eq!(output.stats.unresolved_regions, 0);
    assert_eq!(output.graph.facilities["1"].region.as_deref(), Some("a"));
    assert!(output.graph.located_in.contains_key("1"));
}

#[tokio::test]
async fn description_mining_adds_reduced_confidence_claims() {
    let csv = write_csv(&[
        r#"1,Alpha Clinic,,A Town,A Region,,,,,We run a busy laboratory and an ambulance service.,http://src.example/alpha"#,
    ]);
    let output = run(&csv, &PipelineOptions::default()).await;

    let claims = &output.graph.has_equipment["1"];
    assert_eq!(claims["laboratory"].confidence, 0.7);
    assert_eq!(claims["laboratory"].source_field, "description");
    assert!(claims.contains_key("ambulance"));
    assert!(output.stats.normalization.mined_claims >= 2);
}

#[tokio::test]
async fn snapshot_export_round_trip() {
    let csv = write_csv(&[
        r#"1,Alpha Eye Clinic,,A Town,A Region,"[""Ophthalmology""]",,"[""operating theatre""]","[""cataract surgery""]",,http://src.example/alpha"#,
    ]);
    let output = run(&csv, &PipelineOptions::default()).await;

    let dir = tempfile::tempdir().unwrap();
    let paths = export_snapshot(
        &output.graph,
        dir.path(),
        &output.dataset_id,
        &output.stats,
    )
    .unwrap();

    let reloaded = load_snapshot(&paths.graph).unwrap();
    assert_eq!(reloaded.total_nodes(), output.graph.total_nodes());
    assert_eq!(reloaded.total_edges(), output.graph.total_edges());
    assert_eq!(
        serde_json::to_string(&reloaded).unwrap(),
        serde_json::to_string(&output.graph).unwrap()
    );
    reloaded.validate().unwrap();
}
