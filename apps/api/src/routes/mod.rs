pub mod chat;
pub mod health;
pub mod users;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::liveness_handler))
        // Record store API
        .route("/api/user", post(users::handle_create_user))
        .route("/api/user/:email", get(users::handle_get_user))
        // Conversation API
        .route("/api/chat", post(chat::handle_start_session))
        .route("/api/chat/:id", post(chat::handle_message))
        .with_state(state)
}
