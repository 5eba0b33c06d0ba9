// src/routes/complaints.rs

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{api_error, ApiResult};
use crate::{
    models::{Complaint, NewComplaint, StatusUpdate, TagFacet},
    service::ComplaintFilter,
    AppState,
};

#[derive(Deserialize)]
pub struct AssignBody {
    /// Let the router choose when absent.
    pub field_manager_id: Option<String>,
    pub assigned_by: Option<String>,
}

#[derive(Deserialize)]
pub struct EscalateBody {
    pub reason: Option<String>,
    pub author: Option<String>,
}

#[derive(Deserialize)]
pub struct NoteBody {
    pub text: String,
    pub author: Option<String>,
}

#[derive(Deserialize)]
pub struct TagBody {
    pub tag: String,
    #[serde(default = "custom_facet")]
    pub facet: TagFacet,
}

fn custom_facet() -> TagFacet {
    TagFacet::Custom
}

#[derive(Deserialize)]
pub struct TagQ {
    pub facet: Option<TagFacet>,
}

/// POST /api/v1/complaints
pub async fn create_complaint(
    State(state): State<AppState>,
    Json(b): Json<NewComplaint>,
) -> ApiResult<Complaint> {
    let complaint = state.service.submit(b).await.map_err(api_error)?;
    if let Some(sim) = &state.simulator {
        if !complaint.status.is_terminal() {
            sim.start(&complaint.id);
        }
    }
    Ok(Json(complaint))
}

/// GET /api/v1/complaints
pub async fn list_complaints(
    State(state): State<AppState>,
    Query(q): Query<ComplaintFilter>,
) -> ApiResult<Vec<Complaint>> {
    let rows = state.service.list(&q).await.map_err(api_error)?;
    Ok(Json(rows))
}

/// GET /api/v1/complaints/:id
pub async fn get_complaint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Complaint> {
    let row = state.service.get(&id).await.map_err(api_error)?;
    Ok(Json(row))
}

/// POST /api/v1/complaints/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(b): Json<StatusUpdate>,
) -> ApiResult<Complaint> {
    let row = state.service.update_status(&id, b).await.map_err(api_error)?;
    if row.status.is_terminal() {
        state.cancel_simulation(&id);
    }
    Ok(Json(row))
}

/// POST /api/v1/complaints/:id/assign
pub async fn assign_complaint(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(b): Json<AssignBody>,
) -> ApiResult<Complaint> {
    let author = b.assigned_by.as_deref().unwrap_or("officer-manager");
    let row = state
        .service
        .assign(&id, b.field_manager_id.as_deref(), author)
        .await
        .map_err(api_error)?;
    Ok(Json(row))
}

/// POST /api/v1/complaints/:id/escalate
pub async fn escalate_complaint(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(b): Json<EscalateBody>,
) -> ApiResult<Complaint> {
    let author = b.author.as_deref().unwrap_or("officer-manager");
    let row = state
        .service
        .escalate(&id, b.reason, author)
        .await
        .map_err(api_error)?;
    state.cancel_simulation(&id);
    Ok(Json(row))
}

/// POST /api/v1/complaints/:id/notes
pub async fn add_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(b): Json<NoteBody>,
) -> ApiResult<Complaint> {
    let author = b.author.as_deref().unwrap_or("anonymous");
    let row = state
        .service
        .add_note(&id, &b.text, author)
        .await
        .map_err(api_error)?;
    Ok(Json(row))
}

/// POST /api/v1/complaints/:id/tags
pub async fn add_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(b): Json<TagBody>,
) -> ApiResult<serde_json::Value> {
    let changed = state
        .service
        .add_tag(&id, b.facet, &b.tag)
        .await
        .map_err(api_error)?;
    Ok(Json(serde_json::json!({ "changed": changed })))
}

/// DELETE /api/v1/complaints/:id/tags
pub async fn remove_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(b): Json<TagBody>,
) -> ApiResult<serde_json::Value> {
    let changed = state
        .service
        .remove_tag(&id, b.facet, &b.tag)
        .await
        .map_err(api_error)?;
    Ok(Json(serde_json::json!({ "changed": changed })))
}

/// GET /api/v1/tags/:tag/complaints
pub async fn list_by_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Query(q): Query<TagQ>,
) -> ApiResult<Vec<Complaint>> {
    let rows = state
        .service
        .find_by_tag(&tag, q.facet)
        .await
        .map_err(api_error)?;
    Ok(Json(rows))
}
