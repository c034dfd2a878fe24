//! Ingest stages: load & clean, region resolution, deduplication

pub mod dedup;
pub mod loader;
pub mod regions;

pub use loader::{load_csv, LoadReport, SourceRecord};
