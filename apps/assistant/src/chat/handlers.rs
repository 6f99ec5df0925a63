use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::chat::pipeline::{ConfirmOutcome, ConfirmRequest, TurnOutcome, TurnRequest};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/chat/message
/// Runs one chat turn. Guard rejections (invalid input, rate limit, kill
/// switch) come back as tagged outcomes in a 200 body.
pub async fn handle_message(
    State(state): State<AppState>,
    Json(req): Json<TurnRequest>,
) -> Result<Json<TurnOutcome>, AppError> {
    let outcome = state.pipeline.handle_message(req).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/chat/confirm
/// Resolves a previously proposed navigation. Requirements are re-checked.
pub async fn handle_confirm(
    State(state): State<AppState>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<ConfirmOutcome>, AppError> {
    let outcome = state.pipeline.confirm(req).await?;
    Ok(Json(outcome))
}

/// DELETE /api/v1/chat/session/:session_id
/// Drops the in-memory context for a conversation.
pub async fn handle_clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<Value> {
    state.pipeline.sessions().clear(&session_id);
    Json(json!({ "cleared": session_id }))
}
