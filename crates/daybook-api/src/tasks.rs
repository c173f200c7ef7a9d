use axum::{
    Extension, Json,
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
};

use daybook_session::SharedSession;
use daybook_types::api::AddTaskRequest;

use crate::{join_error, lock_session, store_unavailable};

/// Display order: newest first, straight from the session mirror.
pub async fn list_tasks(
    Extension(session): Extension<SharedSession>,
) -> Result<impl IntoResponse, StatusCode> {
    let locked = lock_session(&session)?;
    Ok(Json(locked.tasks().to_vec()))
}

pub async fn add_task(
    Extension(session): Extension<SharedSession>,
    Json(req): Json<AddTaskRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    if req.text.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let task = tokio::task::spawn_blocking(move || {
        let mut locked = lock_session(&session)?;
        locked
            .add_task(&req.text, req.priority)
            .map_err(store_unavailable)
    })
    .await
    .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Flip completion of the task at the given display position. Out-of-range
/// positions fall through as a no-op.
pub async fn complete_task(
    Extension(session): Extension<SharedSession>,
    Path(position): Path<usize>,
) -> Result<StatusCode, StatusCode> {
    tokio::task::spawn_blocking(move || {
        let mut locked = lock_session(&session)?;
        locked.toggle_completed(position).map_err(store_unavailable)
    })
    .await
    .map_err(join_error)??;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_task(
    Extension(session): Extension<SharedSession>,
    Path(position): Path<usize>,
) -> Result<StatusCode, StatusCode> {
    tokio::task::spawn_blocking(move || {
        let mut locked = lock_session(&session)?;
        locked.delete_task(position).map_err(store_unavailable)
    })
    .await
    .map_err(join_error)??;

    Ok(StatusCode::NO_CONTENT)
}
