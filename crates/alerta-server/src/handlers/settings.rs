//! `GET /settings` / `POST /settings/mode` (§6.1): the server-wide default
//! `mode` applied to requests that don't name their own.

use crate::error::AppError;
use crate::state::AppState;
use alerta_core::Mode;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub mode: Mode,
}

#[derive(Debug, Deserialize)]
pub struct SetModeRequest {
    pub mode: Mode,
}

pub async fn get_settings(State(state): State<AppState>) -> Json<SettingsResponse> {
    let mode = *state.default_mode.read().unwrap();
    Json(SettingsResponse { mode })
}

pub async fn set_mode(State(state): State<AppState>, Json(req): Json<SetModeRequest>) -> Result<Json<SettingsResponse>, AppError> {
    let mut guard = state.default_mode.write().map_err(|_| AppError::Internal("settings lock poisoned".to_string()))?;
    *guard = req.mode;
    Ok(Json(SettingsResponse { mode: req.mode }))
}
