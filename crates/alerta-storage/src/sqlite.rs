//! SQLite-backed primary [`ResultStore`](crate::ResultStore) implementation.
//!
//! Uses `sqlx`'s runtime `query()` API rather than the `query!` compile-time
//! macro: the macro needs a live database reachable at build time, which
//! this workspace cannot assume.

use crate::error::Result;
use crate::models::{AnalysisResult, IngestedUrl, Report};
use crate::ResultStore;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        // A pool of `:memory:` connections each get their own private
        // database unless capped to one connection, since sqlite's
        // in-memory mode has no file to share across handles.
        let is_in_memory = database_url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(if is_in_memory { 1 } else { 5 })
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS ingested_urls (
                url TEXT NOT NULL,
                url_hash TEXT NOT NULL,
                label INTEGER NOT NULL,
                source TEXT,
                raw_payload TEXT,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS reports (
                url TEXT NOT NULL,
                url_hash TEXT NOT NULL,
                label TEXT NOT NULL,
                comment TEXT,
                contact TEXT,
                source TEXT,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS analysis_results (
                url TEXT NOT NULL,
                url_hash TEXT NOT NULL,
                score INTEGER NOT NULL,
                risk_level TEXT NOT NULL,
                signals TEXT NOT NULL,
                ml_score INTEGER,
                heuristic_score INTEGER NOT NULL,
                tranco_verified INTEGER NOT NULL,
                virustotal_checked INTEGER NOT NULL,
                duration_ms INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ResultStore for SqliteStore {
    async fn ingest(&self, record: &IngestedUrl) -> Result<()> {
        sqlx::query(
            "INSERT INTO ingested_urls (url, url_hash, label, source, raw_payload, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.url)
        .bind(&record.url_hash)
        .bind(record.label as i64)
        .bind(&record.source)
        .bind(record.raw_payload.as_ref().map(|v| v.to_string()))
        .bind(&record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn report(&self, record: &Report) -> Result<()> {
        sqlx::query(
            "INSERT INTO reports (url, url_hash, label, comment, contact, source, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.url)
        .bind(&record.url_hash)
        .bind(&record.label)
        .bind(&record.comment)
        .bind(&record.contact)
        .bind(&record.source)
        .bind(&record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_analysis(&self, record: &AnalysisResult) -> Result<()> {
        sqlx::query(
            "INSERT INTO analysis_results
                (url, url_hash, score, risk_level, signals, ml_score, heuristic_score,
                 tranco_verified, virustotal_checked, duration_ms, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.url)
        .bind(&record.url_hash)
        .bind(record.score)
        .bind(&record.risk_level)
        .bind(record.signals.to_string())
        .bind(record.ml_score)
        .bind(record.heuristic_score)
        .bind(record.tranco_verified)
        .bind(record.virustotal_checked)
        .bind(record.duration_ms)
        .bind(&record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn count_analyses(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM analysis_results")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>("n")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn migrate_is_idempotent_and_records_round_trip() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();

        store
            .record_analysis(&AnalysisResult {
                url: "https://example.com".to_string(),
                url_hash: "hash".to_string(),
                score: 12,
                risk_level: "LOW".to_string(),
                signals: json!([]),
                ml_score: Some(10),
                heuristic_score: 15,
                tranco_verified: true,
                virustotal_checked: false,
                duration_ms: 9,
                created_at: "2026-01-01T00:00:00Z".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(store.count_analyses().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn ingest_and_report_insert_without_error() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();

        store
            .ingest(&IngestedUrl {
                url: "https://example.com".to_string(),
                url_hash: "hash".to_string(),
                label: 1,
                source: Some("seed".to_string()),
                raw_payload: Some(json!({"note": "test"})),
                created_at: "2026-01-01T00:00:00Z".to_string(),
            })
            .await
            .unwrap();

        store
            .report(&Report {
                url: "https://example.com".to_string(),
                url_hash: "hash".to_string(),
                label: "phishing".to_string(),
                comment: None,
                contact: None,
                source: None,
                created_at: "2026-01-01T00:00:00Z".to_string(),
            })
            .await
            .unwrap();
    }
}
