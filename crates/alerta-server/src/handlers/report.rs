//! `POST /report` (§6.1): a user-submitted abuse report.

use crate::error::AppError;
use crate::state::AppState;
use alerta_storage::Report;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub url: String,
    pub label: ReportLabel,
    pub comment: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportLabel {
    Phishing,
    Malware,
    Scam,
    Spam,
    Unknown,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub status: &'static str,
    pub report_id: String,
}

pub async fn report(State(state): State<AppState>, Json(req): Json<ReportRequest>) -> Result<Json<ReportResponse>, AppError> {
    if req.url.trim().is_empty() {
        return Err(AppError::BadRequest("url must not be empty".to_string()));
    }

    let record = Report {
        url: req.url.clone(),
        url_hash: hash_url(&req.url),
        label: serde_json::to_value(&req.label).unwrap_or_default().as_str().unwrap_or("unknown").to_string(),
        comment: req.comment,
        contact: req.contact,
        source: Some("api".to_string()),
        created_at: Utc::now().to_rfc3339(),
    };

    state.engine.report(&record).await?;

    Ok(Json(ReportResponse {
        status: "received",
        report_id: Uuid::new_v4().to_string(),
    }))
}

fn hash_url(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}
