//! Persisted normalization cache
//!
//! SQLite table mapping `(vocab_version, domain, phrase)` to a canonical key
//! or an explicit no-match sentinel. The cache is append-only: entries are
//! written with INSERT OR IGNORE and never updated or deleted, so a crashed
//! run leaves at worst a smaller cache. Rows from older vocabulary versions
//! are simply never read again.

use crate::vocab::Domain;
use hfa_common::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Stored value for a phrase the classifier could not map
pub const NO_MATCH_SENTINEL: &str = "__no_match__";

/// Cached classification outcome for a phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedOutcome {
    /// Mapped to this canonical key
    Match(String),
    /// Classified before and known not to match anything
    NoMatch,
}

pub struct NormalizationCache {
    pool: SqlitePool,
}

impl NormalizationCache {
    /// Open (creating if missing) a cache database file
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;
        let cache = NormalizationCache { pool };
        cache.init().await?;
        info!(path = %path.display(), "Opened normalization cache");
        Ok(cache)
    }

    /// Open a throwaway in-memory cache
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new().in_memory(true);
        // A single connection keeps every query on the same in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let cache = NormalizationCache { pool };
        cache.init().await?;
        Ok(cache)
    }

    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS normalization_cache (
                vocab_version TEXT NOT NULL,
                domain        TEXT NOT NULL,
                phrase        TEXT NOT NULL,
                canonical_key TEXT NOT NULL,
                PRIMARY KEY (vocab_version, domain, phrase)
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Look up one phrase (stored lowercase)
    pub async fn get(
        &self,
        vocab_version: &str,
        domain: Domain,
        phrase: &str,
    ) -> Result<Option<CachedOutcome>> {
        let row = sqlx::query(
            "SELECT canonical_key FROM normalization_cache
             WHERE vocab_version = ? AND domain = ? AND phrase = ?",
        )
        .bind(vocab_version)
        .bind(domain.as_str())
        .bind(phrase.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let key: String = row.get("canonical_key");
            if key == NO_MATCH_SENTINEL {
                CachedOutcome::NoMatch
            } else {
                CachedOutcome::Match(key)
            }
        }))
    }

    /// Load every cached phrase for one domain at the current vocabulary
    /// version; read once at the start of the normalization stage
    pub async fn load_domain(
        &self,
        vocab_version: &str,
        domain: Domain,
    ) -> Result<BTreeMap<String, CachedOutcome>> {
        let rows = sqlx::query(
            "SELECT phrase, canonical_key FROM normalization_cache
             WHERE vocab_version = ? AND domain = ?",
        )
        .bind(vocab_version)
        .bind(domain.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut out = BTreeMap::new();
        for row in rows {
            let phrase: String = row.get("phrase");
            let key: String = row.get("canonical_key");
            let outcome = if key == NO_MATCH_SENTINEL {
                CachedOutcome::NoMatch
            } else {
                CachedOutcome::Match(key)
            };
            out.insert(phrase, outcome);
        }
        Ok(out)
    }

    /// Record a classification outcome; existing rows win
    pub async fn put(
        &self,
        vocab_version: &str,
        domain: Domain,
        phrase: &str,
        outcome: &CachedOutcome,
    ) -> Result<()> {
        let key = match outcome {
            CachedOutcome::Match(key) => key.as_str(),
            CachedOutcome::NoMatch => NO_MATCH_SENTINEL,
        };
        sqlx::query(
            "INSERT OR IGNORE INTO normalization_cache
             (vocab_version, domain, phrase, canonical_key)
             VALUES (?, ?, ?, ?)",
        )
        .bind(vocab_version)
        .bind(domain.as_str())
        .bind(phrase.to_lowercase())
        .bind(key)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_match_and_no_match() {
        let cache = NormalizationCache::open_in_memory().await.unwrap();

        cache
            .put(
                "v1",
                Domain::Equipment,
                "Phillips HD11",
                &CachedOutcome::Match("ultrasound".into()),
            )
            .await
            .unwrap();
        cache
            .put("v1", Domain::Equipment, "tea kettle", &CachedOutcome::NoMatch)
            .await
            .unwrap();

        assert_eq!(
            cache.get("v1", Domain::Equipment, "phillips hd11").await.unwrap(),
            Some(CachedOutcome::Match("ultrasound".into()))
        );
        assert_eq!(
            cache.get("v1", Domain::Equipment, "tea kettle").await.unwrap(),
            Some(CachedOutcome::NoMatch)
        );
        assert_eq!(
            cache.get("v1", Domain::Equipment, "unseen").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn entries_are_scoped_by_version_and_domain() {
        let cache = NormalizationCache::open_in_memory().await.unwrap();
        cache
            .put(
                "v1",
                Domain::Equipment,
                "scanner",
                &CachedOutcome::Match("ct_scanner".into()),
            )
            .await
            .unwrap();

        assert!(cache.get("v2", Domain::Equipment, "scanner").await.unwrap().is_none());
        assert!(cache.get("v1", Domain::Capability, "scanner").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_is_append_only() {
        let cache = NormalizationCache::open_in_memory().await.unwrap();
        cache
            .put(
                "v1",
                Domain::Capability,
                "eye clinic",
                &CachedOutcome::Match("eye_examination".into()),
            )
            .await
            .unwrap();
        // Second write for the same phrase is ignored
        cache
            .put("v1", Domain::Capability, "eye clinic", &CachedOutcome::NoMatch)
            .await
            .unwrap();

        assert_eq!(
            cache.get("v1", Domain::Capability, "eye clinic").await.unwrap(),
            Some(CachedOutcome::Match("eye_examination".into()))
        );
    }

    #[tokio::test]
    async fn load_domain_returns_all_entries() {
        let cache = NormalizationCache::open_in_memory().await.unwrap();
        cache
            .put(
                "v1",
                Domain::Equipment,
                "B",
                &CachedOutcome::Match("xray_machine".into()),
            )
            .await
            .unwrap();
        cache
            .put("v1", Domain::Equipment, "a", &CachedOutcome::NoMatch)
            .await
            .unwrap();

        let loaded = cache.load_domain("v1", Domain::Equipment).await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("a"), Some(&CachedOutcome::NoMatch));
        assert_eq!(
            loaded.get("b"),
            Some(&CachedOutcome::Match("xray_machine".into()))
        );
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.sqlite");

        {
            let cache = NormalizationCache::open(&path).await.unwrap();
            cache
                .put(
                    "v1",
                    Domain::Equipment,
                    "echo machine",
                    &CachedOutcome::Match("ultrasound".into()),
                )
                .await
                .unwrap();
        }

        let cache = NormalizationCache::open(&path).await.unwrap();
        assert_eq!(
            cache.get("v1", Domain::Equipment, "echo machine").await.unwrap(),
            Some(CachedOutcome::Match("ultrasound".into()))
        );
    }
}
