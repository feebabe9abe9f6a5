//! `GET /whois/{domain}` (§6.1): a direct WHOIS pass-through, independent
//! of the scoring pipeline.

use crate::error::AppError;
use crate::state::AppState;
use alerta_reputation::Outcome;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct WhoisResponse {
    pub domain: String,
    pub age_days: Option<i64>,
    pub is_new_domain: bool,
    pub risk_indicator: &'static str,
}

pub async fn whois(State(state): State<AppState>, Path(domain): Path<String>) -> Result<Json<WhoisResponse>, AppError> {
    let registrable_domain = psl::domain(domain.as_bytes())
        .map(|d| String::from_utf8_lossy(d.as_bytes()).into_owned())
        .unwrap_or_else(|| domain.clone());

    match state.engine.whois_lookup(&registrable_domain).await {
        Outcome::Available(payload) => {
            let is_new_domain = payload.age_days.is_some_and(|d| d < 30);
            let risk_indicator = match payload.age_days {
                Some(d) if d < 30 => "new",
                Some(d) if d > 365 => "established",
                Some(_) => "neutral",
                None if payload.available => "unregistered",
                None => "unknown",
            };
            Ok(Json(WhoisResponse {
                domain: registrable_domain,
                age_days: payload.age_days,
                is_new_domain,
                risk_indicator,
            }))
        }
        Outcome::Unavailable => Err(AppError::Internal("whois lookup unavailable".to_string())),
    }
}
