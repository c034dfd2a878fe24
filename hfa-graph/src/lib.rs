//! hfa-graph — Health Facility Atlas knowledge graph pipeline
//!
//! Batch pipeline turning a messy multi-source spreadsheet of healthcare
//! facility records into a typed knowledge graph:
//!
//! 1. Load & clean CSV (JSON list columns, numeric coercion, row exclusion)
//! 2. Resolve free-text regions against the country configuration
//! 3. Deduplicate multi-source rows by stable identifier
//! 4. Normalize free-text claims to the canonical vocabulary
//!    (keyword pass, then a cached classification callback)
//! 5. Build the base graph (Region/Facility/Organization nodes, HAS_* edges)
//! 6. Infer LACKS and COULD_SUPPORT edges
//! 7. Detect specialty coverage deserts (DESERT_FOR edges)
//! 8. Export the snapshot + metadata summary
//!
//! The finished graph is immutable; downstream consumers read it through the
//! pure functions in [`query`].

pub mod graph;
pub mod ingest;
pub mod pipeline;
pub mod query;
pub mod vocab;

pub use pipeline::{run_pipeline, PipelineOptions, PipelineOutput, RunStats};
