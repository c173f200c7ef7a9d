use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{error, warn};

use daybook_assistant::{AskError, QUICK_PROMPTS, ask};
use daybook_session::SharedSession;
use daybook_types::api::AskRequest;

use crate::auth::AppState;
use crate::lock_session;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// The chronological tail of the conversation, most recent `limit` messages.
pub async fn get_history(
    Extension(session): Extension<SharedSession>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let limit = query.limit.min(200);
    let locked = lock_session(&session)?;
    Ok(Json(locked.recent_messages(limit).to_vec()))
}

/// One chat exchange. On success the response carries the assistant's message;
/// the user's message is already in the history at that point. On model
/// failure nothing is persisted and the error text travels in the body.
pub async fn post_message(
    State(state): State<AppState>,
    Extension(session): Extension<SharedSession>,
    Json(req): Json<AskRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.text.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "message text is empty".to_string()));
    }

    match ask(session, state.assistant.clone(), req.text).await {
        Ok(message) => Ok((StatusCode::CREATED, Json(message))),
        Err(AskError::Assistant(e)) => {
            warn!("Assistant exchange failed: {}", e);
            Err((StatusCode::BAD_GATEWAY, format!("assistant unavailable: {e}")))
        }
        Err(AskError::Store(e)) => {
            error!("Store error during exchange: {}", e);
            Err((StatusCode::SERVICE_UNAVAILABLE, "store unavailable".to_string()))
        }
        Err(AskError::Join(e)) => {
            error!("Exchange task failed: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string()))
        }
    }
}

/// The canned shortcut inputs for the view's quick-action buttons.
pub async fn quick_prompts() -> impl IntoResponse {
    Json(QUICK_PROMPTS)
}
