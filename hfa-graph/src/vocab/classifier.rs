//! Classification callback for phrases the keyword pass misses
//!
//! The pipeline does not talk to a language model directly; it accepts any
//! [`Classifier`] implementation at its boundary. The HTTP implementation
//! posts batches to an external classification service; the no-op
//! implementation matches nothing and keeps the pipeline fully offline.

use crate::vocab::{tables, Domain};
use async_trait::async_trait;
use hfa_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Maps raw phrases to canonical keys, batch at a time
///
/// The returned vector is positional: `result[i]` is the canonical key for
/// `batch[i]`, or `None` when no vocabulary entry fits. Implementations must
/// return exactly one element per input phrase.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, domain: Domain, batch: &[String]) -> Result<Vec<Option<String>>>;
}

/// Classifier that matches nothing
///
/// Keeps the pipeline deterministic and offline; unmatched phrases simply
/// stay unmatched.
pub struct NoopClassifier;

#[async_trait]
impl Classifier for NoopClassifier {
    async fn classify(&self, _domain: Domain, batch: &[String]) -> Result<Vec<Option<String>>> {
        Ok(vec![None; batch.len()])
    }
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    domain: &'a str,
    canonical_keys: Vec<&'static str>,
    items: &'a [String],
}

#[derive(Deserialize)]
struct ClassifyResponse {
    results: Vec<Option<String>>,
}

/// HTTP classification client
///
/// Posts `{domain, canonical_keys, items}` to `{base_url}/classify` and
/// expects `{results: [key-or-null, ...]}` positionally aligned with the
/// items. Keys outside the canonical vocabulary are treated as no-match.
pub struct HttpClassifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClassifier {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(HttpClassifier {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, domain: Domain, batch: &[String]) -> Result<Vec<Option<String>>> {
        let url = format!("{}/classify", self.base_url);
        let request = ClassifyRequest {
            domain: domain.as_str(),
            canonical_keys: tables::keys(domain),
            items: batch,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Internal(format!("Classification request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Internal(format!(
                "Classification service returned {}",
                response.status()
            )));
        }

        let parsed: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| Error::Internal(format!("Bad classification response: {}", e)))?;

        if parsed.results.len() != batch.len() {
            return Err(Error::Internal(format!(
                "Classification response length mismatch: {} items, {} results",
                batch.len(),
                parsed.results.len()
            )));
        }

        let results = parsed
            .results
            .into_iter()
            .map(|result| {
                result.and_then(|key| {
                    if tables::entry(domain, &key).is_some() {
                        Some(key)
                    } else {
                        warn!(domain = %domain, key = %key, "Classifier returned unknown key");
                        None
                    }
                })
            })
            .collect();

        debug!(domain = %domain, items = batch.len(), "Classified batch");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_matches_nothing() {
        let classifier = NoopClassifier;
        let batch = vec!["mystery device".to_string(), "another one".to_string()];
        let results = classifier
            .classify(Domain::Equipment, &batch)
            .await
            .unwrap();
        assert_eq!(results, vec![None, None]);
    }

    #[tokio::test]
    async fn noop_preserves_batch_length() {
        let classifier = NoopClassifier;
        let results = classifier.classify(Domain::Capability, &[]).await.unwrap();
        assert!(results.is_empty());
    }
}
