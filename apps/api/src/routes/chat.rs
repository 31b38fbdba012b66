use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::screening::conversation::Stage;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub session_id: Uuid,
    pub reply: String,
    pub stage: Stage,
    pub done: bool,
}

/// POST /api/chat
/// Starts a screening session and returns the greeting.
pub async fn handle_start_session(State(state): State<AppState>) -> Json<ChatReply> {
    let reply = state.screening.start_session().await;
    Json(ChatReply {
        session_id: reply.session_id,
        reply: reply.reply,
        stage: reply.stage,
        done: reply.done,
    })
}

/// POST /api/chat/:id
/// One conversation turn: candidate message in, assistant reply out.
pub async fn handle_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ChatMessage>,
) -> Result<Json<ChatReply>, AppError> {
    let reply = state.screening.handle_message(id, &body.message).await?;
    Ok(Json(ChatReply {
        session_id: reply.session_id,
        reply: reply.reply,
        stage: reply.stage,
        done: reply.done,
    }))
}
