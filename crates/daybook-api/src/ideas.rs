use axum::{
    Extension, Json,
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
};

use daybook_session::SharedSession;
use daybook_types::api::AddIdeaRequest;

use crate::{join_error, lock_session, store_unavailable};

pub async fn list_ideas(
    Extension(session): Extension<SharedSession>,
) -> Result<impl IntoResponse, StatusCode> {
    let locked = lock_session(&session)?;
    Ok(Json(locked.ideas().to_vec()))
}

pub async fn add_idea(
    Extension(session): Extension<SharedSession>,
    Json(req): Json<AddIdeaRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.text.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let idea = tokio::task::spawn_blocking(move || {
        let mut locked = lock_session(&session)?;
        locked
            .add_idea(&req.text, &req.category)
            .map_err(store_unavailable)
    })
    .await
    .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(idea)))
}

pub async fn delete_idea(
    Extension(session): Extension<SharedSession>,
    Path(position): Path<usize>,
) -> Result<StatusCode, StatusCode> {
    tokio::task::spawn_blocking(move || {
        let mut locked = lock_session(&session)?;
        locked.delete_idea(position).map_err(store_unavailable)
    })
    .await
    .map_err(join_error)??;

    Ok(StatusCode::NO_CONTENT)
}
