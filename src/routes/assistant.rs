// src/routes/assistant.rs

use axum::{extract::State, Json};
use serde::Deserialize;

use super::{api_error, ApiResult};
use crate::{
    assistant::{self, Reply, ReplyKind},
    AppState,
};

#[derive(Deserialize)]
pub struct MessageBody {
    pub message: String,
    pub sender: Option<String>,
}

/// POST /api/v1/assistant/messages
pub async fn post_message(
    State(state): State<AppState>,
    Json(b): Json<MessageBody>,
) -> ApiResult<Reply> {
    let reply = assistant::respond(&state.service, &b.message, b.sender)
        .await
        .map_err(api_error)?;

    if reply.kind == ReplyKind::Filed {
        if let (Some(sim), Some(c)) = (&state.simulator, reply.complaints.first()) {
            if !c.status.is_terminal() {
                sim.start(&c.id);
            }
        }
    }
    Ok(Json(reply))
}
