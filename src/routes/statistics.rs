// src/routes/statistics.rs

use axum::{extract::State, Json};

use super::{api_error, ApiResult};
use crate::{models::Statistics, AppState};

/// GET /api/v1/statistics
pub async fn get_statistics(State(state): State<AppState>) -> ApiResult<Statistics> {
    let stats = state.service.statistics().await.map_err(api_error)?;
    Ok(Json(stats))
}
