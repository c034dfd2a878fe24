//! Keyword pass of the vocabulary normalizer
//!
//! Compiles the alias lists of a vocabulary into word-boundary regexes,
//! longest alias first so the most specific phrase wins ("operating theatre"
//! before "theatre"). An optional plural suffix makes "theatres" and
//! "ambulances" match. The pass is fully deterministic: the same phrase
//! always yields the same key.

use crate::vocab::{tables, Domain};
use hfa_common::{Error, Result};
use regex::Regex;

/// Compiled alias index for one vocabulary domain
pub struct Matcher {
    domain: Domain,
    /// (pattern, canonical key), sorted by alias length descending
    patterns: Vec<(Regex, &'static str)>,
}

impl Matcher {
    /// Compile the alias index for `domain`
    pub fn new(domain: Domain) -> Result<Self> {
        let mut aliases: Vec<(&'static str, &'static str)> = Vec::new();
        for entry in tables::entries(domain) {
            for alias in entry.aliases {
                aliases.push((alias, entry.key));
            }
        }
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));

        let mut patterns = Vec::with_capacity(aliases.len());
        for (alias, key) in aliases {
            let pattern = format!(r"(?i)\b{}(?:e?s)?\b", regex::escape(alias));
            let regex = Regex::new(&pattern).map_err(|e| {
                Error::Internal(format!("Bad alias pattern for '{}': {}", alias, e))
            })?;
            patterns.push((regex, key));
        }

        Ok(Matcher { domain, patterns })
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Match a single short phrase; at most one canonical key, longest
    /// matching alias wins
    pub fn match_phrase(&self, phrase: &str) -> Option<&'static str> {
        let phrase = phrase.trim();
        if phrase.is_empty() {
            return None;
        }
        self.patterns
            .iter()
            .find(|(regex, _)| regex.is_match(phrase))
            .map(|(_, key)| *key)
    }

    /// Scan a longer text blob; all distinct canonical keys found, in
    /// longest-alias-first order
    pub fn scan_text(&self, text: &str) -> Vec<&'static str> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let mut found: Vec<&'static str> = Vec::new();
        for (regex, key) in &self.patterns {
            if !found.contains(key) && regex.is_match(text) {
                found.push(key);
            }
        }
        found
    }
}
