//! Persistence collaborator (§6.3): a store accepting append-like writes
//! of ingested URLs, abuse reports, and analysis results.
//!
//! Two implementations share one [`ResultStore`] contract so the choice
//! is transparent to the core: [`sqlite::SqliteStore`] backs a
//! relational database, [`json::JsonFileStore`] appends JSON Lines
//! records per kind. [`from_database_url`] selects between them exactly
//! as `DATABASE_URL`'s presence dictates (§6.4).

mod error;
pub mod json;
pub mod models;
pub mod sqlite;

pub use error::{Result, StorageError};
pub use json::JsonFileStore;
pub use models::{AnalysisResult, IngestedUrl, Report};
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use std::path::Path;

/// The persistence contract the orchestrator writes through. Every
/// method is append-only: nothing in this crate ever mutates or deletes
/// a previously written record.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn ingest(&self, record: &IngestedUrl) -> Result<()>;
    async fn report(&self, record: &Report) -> Result<()>;
    async fn record_analysis(&self, record: &AnalysisResult) -> Result<()>;
    async fn count_analyses(&self) -> Result<i64>;
}

/// Select the primary or fallback store per spec §6.3: a configured
/// `DATABASE_URL` backs [`SqliteStore`]; its absence falls back to
/// [`JsonFileStore`] rooted at `json_dir`.
pub async fn from_database_url(
    database_url: Option<&str>,
    json_dir: &Path,
) -> Result<Box<dyn ResultStore>> {
    match database_url {
        Some(url) => Ok(Box::new(SqliteStore::connect(url).await?)),
        None => Ok(Box::new(JsonFileStore::new(json_dir).await?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn falls_back_to_json_store_without_database_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = from_database_url(None, dir.path()).await.unwrap();
        store
            .ingest(&IngestedUrl {
                url: "https://example.com".to_string(),
                url_hash: "abc".to_string(),
                label: 1,
                source: None,
                raw_payload: Some(json!({})),
                created_at: "2026-01-01T00:00:00Z".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(store.count_analyses().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn selects_sqlite_store_when_database_url_given() {
        let store = from_database_url(Some("sqlite::memory:"), Path::new("/unused"))
            .await
            .unwrap();
        assert_eq!(store.count_analyses().await.unwrap(), 0);
    }
}
