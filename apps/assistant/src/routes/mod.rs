pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::catalog::handlers as catalog_handlers;
use crate::chat::handlers as chat_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/catalog", get(catalog_handlers::handle_list_catalog))
        .route("/api/v1/chat/message", post(chat_handlers::handle_message))
        .route("/api/v1/chat/confirm", post(chat_handlers::handle_confirm))
        .route(
            "/api/v1/chat/session/:session_id",
            delete(chat_handlers::handle_clear_session),
        )
        .with_state(state)
}
