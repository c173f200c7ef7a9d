pub mod auth;
pub mod chat;
pub mod ideas;
pub mod middleware;
pub mod tasks;

use std::sync::MutexGuard;

use axum::{
    Router,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use tracing::error;

use daybook_db::StoreError;
use daybook_session::{Session, SharedSession};

use crate::auth::AppState;

/// Every route the app serves. The server binary layers CORS and tracing on
/// top; tests drive this router directly.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/health", get(health))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/tasks", get(tasks::list_tasks))
        .route("/tasks", post(tasks::add_task))
        .route("/tasks/{position}/complete", post(tasks::complete_task))
        .route("/tasks/{position}", delete(tasks::delete_task))
        .route("/ideas", get(ideas::list_ideas))
        .route("/ideas", post(ideas::add_idea))
        .route("/ideas/{position}", delete(ideas::delete_idea))
        .route("/chat", get(chat::get_history))
        .route("/chat", post(chat::post_message))
        .route("/chat/prompts", get(chat::quick_prompts))
        .layer(from_fn_with_state(state.clone(), middleware::require_auth))
        .with_state(state);

    Router::new().merge(public).merge(protected)
}

/// GET /health — liveness check (no auth).
async fn health() -> &'static str {
    "ok"
}

pub(crate) fn lock_session(session: &SharedSession) -> Result<MutexGuard<'_, Session>, StatusCode> {
    session.lock().map_err(|e| {
        error!("Session lock poisoned: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub(crate) fn store_unavailable(e: StoreError) -> StatusCode {
    error!("Store error: {}", e);
    StatusCode::SERVICE_UNAVAILABLE
}

pub(crate) fn join_error(e: tokio::task::JoinError) -> StatusCode {
    error!("spawn_blocking join error: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}
