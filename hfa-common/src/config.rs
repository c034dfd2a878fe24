//! Country configuration loading
//!
//! Each deployment ships a TOML file describing the canonical administrative
//! regions of one country: population, capital and centroid per region, the
//! raw-string → canonical-region normalization table, the city → region
//! fallback table, and the region adjacency used by desert detection.
//!
//! The configuration is loaded once per pipeline run and is immutable for the
//! duration of the run. Loading validates referential integrity (every alias
//! and adjacency target must name a configured region) and adjacency symmetry.

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Metadata for one canonical region
#[derive(Debug, Clone, Deserialize)]
pub struct RegionConfig {
    /// Human-readable name, e.g. "Greater Accra"
    pub display_name: String,
    /// Resident population (latest census)
    pub population: u64,
    /// Regional capital
    pub capital: String,
    /// Centroid latitude
    pub lat: f64,
    /// Centroid longitude
    pub lng: f64,
    /// Canonical keys of bordering regions (must be symmetric)
    #[serde(default)]
    pub adjacent: Vec<String>,
}

/// Country-specific configuration for the pipeline
///
/// `BTreeMap` keeps region iteration order stable so repeated runs on
/// identical input produce identical graphs.
#[derive(Debug, Clone, Deserialize)]
pub struct CountryConfig {
    /// Country identifier, e.g. "ghana"
    pub country: String,
    /// Canonical regions keyed by lowercase canonical key
    pub regions: BTreeMap<String, RegionConfig>,
    /// Raw `address_stateOrRegion` value (lowercased, trimmed) → canonical key
    #[serde(default)]
    pub region_aliases: BTreeMap<String, String>,
    /// City name (lowercased, trimmed) → canonical key, used as fallback
    #[serde(default)]
    pub city_regions: BTreeMap<String, String>,
}

impl CountryConfig {
    /// Load and validate a country configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: CountryConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        info!(
            country = %config.country,
            regions = config.regions.len(),
            region_aliases = config.region_aliases.len(),
            city_regions = config.city_regions.len(),
            "Loaded country configuration"
        );
        Ok(config)
    }

    /// Validate referential integrity and adjacency symmetry
    fn validate(&self) -> Result<()> {
        if self.regions.is_empty() {
            return Err(Error::Config(format!(
                "Country '{}' defines no regions",
                self.country
            )));
        }

        for (key, target) in &self.region_aliases {
            if !self.regions.contains_key(target) {
                return Err(Error::Config(format!(
                    "Region alias '{}' maps to unknown region '{}'",
                    key, target
                )));
            }
        }

        for (city, target) in &self.city_regions {
            if !self.regions.contains_key(target) {
                return Err(Error::Config(format!(
                    "City '{}' maps to unknown region '{}'",
                    city, target
                )));
            }
        }

        for (key, region) in &self.regions {
            for neighbor in &region.adjacent {
                let other = self.regions.get(neighbor).ok_or_else(|| {
                    Error::Config(format!(
                        "Region '{}' lists unknown neighbor '{}'",
                        key, neighbor
                    ))
                })?;
                if !other.adjacent.iter().any(|n| n == key) {
                    return Err(Error::Config(format!(
                        "Adjacency is not symmetric: '{}' lists '{}' but not vice versa",
                        key, neighbor
                    )));
                }
            }
        }

        Ok(())
    }

    /// Look up the canonical key for a raw region string
    pub fn normalize_region(&self, raw: &str) -> Option<&str> {
        let key = normalize_lookup_key(raw);
        if key.is_empty() {
            return None;
        }
        self.region_aliases.get(&key).map(String::as_str)
    }

    /// Look up the canonical region for a city name
    pub fn region_for_city(&self, city: &str) -> Option<&str> {
        let key = normalize_lookup_key(city);
        if key.is_empty() {
            return None;
        }
        self.city_regions.get(&key).map(String::as_str)
    }
}

/// Collapse whitespace and lowercase for table lookups
fn normalize_lookup_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
