//! The crawl report (§4.7 "Report fields") and its failure taxonomy.

use crate::evidence::Evidence;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CrawlStatus {
    Ok,
    Timeout,
    Error(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrawlReport {
    pub status: CrawlStatus,
    pub final_url: String,
    pub redirect_chain: Vec<String>,
    pub html_fingerprint: String,
    pub evidence: Evidence,
}

impl CrawlReport {
    /// A report for a crawl that never reached a loaded document — SSL
    /// errors still need to survive this path (§4.7), so callers set
    /// `evidence.ssl_error` afterward when applicable.
    pub fn failed(url: &str, status: CrawlStatus) -> Self {
        Self {
            status,
            final_url: url.to_string(),
            redirect_chain: Vec::new(),
            html_fingerprint: String::new(),
            evidence: Evidence::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("failed to launch browser: {0}")]
    Launch(String),
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("dom extraction failed: {0}")]
    Extraction(String),
}
