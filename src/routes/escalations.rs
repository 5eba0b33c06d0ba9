// src/routes/escalations.rs

use axum::{extract::State, Json};
use serde::Serialize;

use super::{api_error, ApiResult};
use crate::AppState;

#[derive(Serialize)]
pub struct SweepResp {
    pub escalated: Vec<String>,
}

/// POST /api/v1/escalations/sweep
pub async fn sweep(State(state): State<AppState>) -> ApiResult<SweepResp> {
    let escalated = state.service.sweep_escalations().await.map_err(api_error)?;
    for id in &escalated {
        state.cancel_simulation(id);
    }
    Ok(Json(SweepResp { escalated }))
}
