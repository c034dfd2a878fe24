//! Shared types for the HFA (Health Facility Atlas) workspace
//!
//! Provides the common error type and country configuration loading used by
//! the graph pipeline.

pub mod config;
pub mod error;

pub use config::{CountryConfig, RegionConfig};
pub use error::{Error, Result};
