//! `GET /health` (§6.1).

use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model_loaded: bool,
    pub apis: ApisConfigured,
}

#[derive(Debug, Serialize)]
pub struct ApisConfigured {
    pub tranco: bool,
    pub virustotal: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: state.engine.model_loaded(),
        apis: ApisConfigured {
            tranco: state.engine.tranco_configured(),
            virustotal: state.engine.virustotal_configured(),
        },
    })
}
