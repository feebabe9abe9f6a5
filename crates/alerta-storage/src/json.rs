//! Append-only JSON-lines fallback [`ResultStore`](crate::ResultStore)
//! implementation, selected when no `DATABASE_URL` is configured (§6.3).
//!
//! Grounded on the pack's webfetch cache module's atomic
//! temp-file-then-rename write pattern, adapted here to *appends*
//! rather than whole-file rewrites: each write opens its kind's file in
//! append mode and writes one JSON object per line, so a crash mid-write
//! never corrupts previously committed records.

use crate::error::Result;
use crate::models::{AnalysisResult, IngestedUrl, Report};
use crate::ResultStore;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub struct JsonFileStore {
    dir: PathBuf,
    // One lock per file serializes concurrent appends; a single
    // `OpenOptions::append` call is not itself atomic across a
    // multi-line write if two writers interleave.
    ingested_lock: Mutex<()>,
    reports_lock: Mutex<()>,
    analyses_lock: Mutex<()>,
}

impl JsonFileStore {
    pub async fn new(dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        Ok(Self {
            dir: dir.to_path_buf(),
            ingested_lock: Mutex::new(()),
            reports_lock: Mutex::new(()),
            analyses_lock: Mutex::new(()),
        })
    }

    async fn append_line(&self, file_name: &str, line: &str) -> Result<()> {
        let path = self.dir.join(file_name);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        Ok(())
    }

    async fn count_lines(&self, file_name: &str) -> Result<i64> {
        let path = self.dir.join(file_name);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content.lines().filter(|l| !l.trim().is_empty()).count() as i64),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ResultStore for JsonFileStore {
    async fn ingest(&self, record: &IngestedUrl) -> Result<()> {
        let _guard = self.ingested_lock.lock().await;
        let line = serde_json::to_string(record)?;
        self.append_line("ingested_urls.jsonl", &line).await
    }

    async fn report(&self, record: &Report) -> Result<()> {
        let _guard = self.reports_lock.lock().await;
        let line = serde_json::to_string(record)?;
        self.append_line("reports.jsonl", &line).await
    }

    async fn record_analysis(&self, record: &AnalysisResult) -> Result<()> {
        let _guard = self.analyses_lock.lock().await;
        let line = serde_json::to_string(record)?;
        self.append_line("analysis_results.jsonl", &line).await
    }

    async fn count_analyses(&self) -> Result<i64> {
        self.count_lines("analysis_results.jsonl").await
    }
}
