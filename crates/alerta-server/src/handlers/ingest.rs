//! `POST /ingest` (§6.1): accepted labeled training data.

use crate::error::AppError;
use crate::state::AppState;
use alerta_storage::IngestedUrl;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub url: String,
    pub label: u8,
    pub source: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
}

pub async fn ingest(State(state): State<AppState>, Json(req): Json<IngestRequest>) -> Result<Json<IngestResponse>, AppError> {
    if req.label != 0 && req.label != 1 {
        return Err(AppError::BadRequest("label must be 0 or 1".to_string()));
    }

    let record = IngestedUrl {
        url: req.url.clone(),
        url_hash: hash_url(&req.url),
        label: req.label,
        source: req.source,
        raw_payload: req.metadata,
        created_at: Utc::now().to_rfc3339(),
    };

    state.engine.ingest(&record).await?;

    Ok(Json(IngestResponse { status: "accepted" }))
}

fn hash_url(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}
