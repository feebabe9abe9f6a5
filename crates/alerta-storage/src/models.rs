//! Records the persistence collaborator accepts (§6.3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestedUrl {
    pub url: String,
    pub url_hash: String,
    pub label: u8,
    pub source: Option<String>,
    pub raw_payload: Option<serde_json::Value>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub url: String,
    pub url_hash: String,
    pub label: String,
    pub comment: Option<String>,
    pub contact: Option<String>,
    pub source: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub url: String,
    pub url_hash: String,
    pub score: i64,
    pub risk_level: String,
    pub signals: serde_json::Value,
    pub ml_score: Option<i64>,
    pub heuristic_score: i64,
    pub tranco_verified: bool,
    pub virustotal_checked: bool,
    pub duration_ms: i64,
    pub created_at: String,
}
