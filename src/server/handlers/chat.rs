use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatPayload {
    pub message: String,
    #[serde(default)]
    pub preferences: Value,
    #[serde(default)]
    pub history: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatPayload>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let answer = state
        .chat
        .handle(
            &payload.message,
            &payload.preferences,
            payload.history.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(ChatResponse {
        response: answer.response,
    }))
}
