//! `POST /analyze` (§6.1, §6.2, §4.9).

use crate::error::AppError;
use crate::state::AppState;
use alerta_core::{AnalyzeOptions, Mode, ModelChoice, Verdict};
use alerta_limiter::Decision;
use axum::extract::{ConnectInfo, State};
use axum::Json;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::net::SocketAddr;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
    #[serde(default)]
    pub model: Option<ModelChoice>,
    #[serde(default)]
    pub mode: Option<Mode>,
    #[serde(default)]
    pub options: Option<AnalyzeRequestOptions>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequestOptions {
    #[serde(default)]
    pub enable_crawler: bool,
    pub timeout_seconds: Option<u64>,
    pub max_redirects: Option<u32>,
}

/// §4.9: the rate limiter wraps this handler entirely, before C1 ever
/// sees the URL.
pub async fn analyze(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<Verdict>, AppError> {
    let client_id = addr.ip().to_string();
    match state.engine.check_rate_limit(&client_id) {
        Decision::Allowed => {}
        Decision::Limited { retry_after_secs } => {
            return Err(AppError::TooManyRequests { retry_after_secs });
        }
    }

    let default_mode = *state.default_mode.read().unwrap();
    let options_in = req.options.unwrap_or_default();
    let options = AnalyzeOptions {
        model: req.model.unwrap_or_default(),
        mode: req.mode.unwrap_or(default_mode),
        enable_crawler: options_in.enable_crawler,
        timeout_seconds: options_in.timeout_seconds,
        max_redirects: options_in.max_redirects,
    };

    // A span per request carrying the same identifiers the verdict's own
    // `timestamps` block reports, so a log line can be correlated back to
    // a response without re-deriving its timing.
    let request_id = Uuid::new_v4();
    let url_hash = hash_url(&req.url);
    let span = tracing::info_span!("analyze", %request_id, url_hash = %url_hash, score = tracing::field::Empty, duration_ms = tracing::field::Empty);

    let verdict = state
        .engine
        .analyze(&req.url, &options)
        .instrument(span.clone())
        .await?;
    span.record("score", verdict.score);
    span.record("duration_ms", verdict.timestamps.duration_ms);
    Ok(Json(verdict))
}

fn hash_url(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}
