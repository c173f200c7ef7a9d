use std::sync::{Arc, LazyLock};

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use regex::Regex;
use tracing::error;
use uuid::Uuid;

use daybook_assistant::AssistantClient;
use daybook_db::Database;
use daybook_session::{
    SessionManager,
    credentials::{self, CredentialError},
};
use daybook_types::api::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::middleware::Claims;
use crate::{join_error, lock_session, store_unavailable};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub sessions: SessionManager,
    pub assistant: Arc<dyn AssistantClient>,
    pub jwt_secret: String,
}

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    // Validate input
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(StatusCode::BAD_REQUEST);
    }
    if req.password.len() < 8 {
        return Err(StatusCode::BAD_REQUEST);
    }
    if !EMAIL_RE.is_match(&req.email) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let username = req.username.clone();
    let app = state.clone();
    // Run hashing and the store writes off the async runtime
    let (user_id, sid) = tokio::task::spawn_blocking(move || {
        let user_id =
            match credentials::register(&app.db, &req.username, &req.email, &req.password) {
                Ok(id) => id,
                Err(CredentialError::Taken) => return Err(StatusCode::CONFLICT),
                Err(CredentialError::Hash(e)) => {
                    error!("Password hashing failed: {}", e);
                    return Err(StatusCode::INTERNAL_SERVER_ERROR);
                }
                Err(CredentialError::Store(e)) => return Err(store_unavailable(e)),
            };

        // Registration logs the new account straight in.
        let row = app
            .db
            .get_user_by_username(&req.username)
            .map_err(store_unavailable)?
            .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
        let (sid, _session) = app
            .sessions
            .open_for(row.into_model())
            .map_err(store_unavailable)?;
        Ok((user_id, sid))
    })
    .await
    .map_err(join_error)??;

    let token = create_token(&state.jwt_secret, user_id, &username, sid)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let app = state.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        app.sessions.login(&req.username, &req.password)
    })
    .await
    .map_err(join_error)?
    .map_err(store_unavailable)?;

    // Unknown user and wrong password look identical from outside.
    let Some((sid, session)) = outcome else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    let (user_id, username) = {
        let locked = lock_session(&session)?;
        (locked.user().id, locked.user().username.clone())
    };

    let token = create_token(&state.jwt_secret, user_id, &username, sid)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(LoginResponse {
        user_id,
        username,
        token,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, StatusCode> {
    state
        .sessions
        .logout(claims.sid)
        .map_err(store_unavailable)?;
    Ok(StatusCode::NO_CONTENT)
}

fn create_token(secret: &str, user_id: i64, username: &str, sid: Uuid) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        sid,
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
