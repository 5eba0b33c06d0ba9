// src/routes/field_managers.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use super::{api_error, ApiResult};
use crate::{
    models::{Department, FieldManager},
    AppState,
};

#[derive(Deserialize)]
pub struct CreateFieldManagerBody {
    pub id: String,
    pub name: String,
    pub department: Department,
    pub area: String,
    pub workload: Option<u32>,
    pub active: Option<bool>,
}

/// POST /api/v1/field-managers
pub async fn create_field_manager(
    State(state): State<AppState>,
    Json(b): Json<CreateFieldManagerBody>,
) -> ApiResult<FieldManager> {
    let manager = FieldManager {
        id: b.id,
        name: b.name,
        department: b.department,
        area: b.area,
        workload: b.workload.unwrap_or(0),
        active: b.active.unwrap_or(true),
    };
    let row = state
        .service
        .register_field_manager(manager)
        .await
        .map_err(api_error)?;
    Ok(Json(row))
}

/// GET /api/v1/field-managers
pub async fn list_field_managers(State(state): State<AppState>) -> ApiResult<Vec<FieldManager>> {
    let rows = state.service.field_managers().await.map_err(api_error)?;
    Ok(Json(rows))
}

/// POST /api/v1/field-managers/:id/release
pub async fn release_field_manager(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<FieldManager> {
    let row = state.service.release(&id).await.map_err(api_error)?;
    Ok(Json(row))
}
