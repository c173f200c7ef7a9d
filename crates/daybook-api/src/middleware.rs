use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    /// Keys the in-process session registry. A token whose session is gone
    /// (logout, server restart) no longer authenticates.
    pub sid: Uuid,
    pub exp: usize,
}

/// Extract and validate the JWT from the Authorization header, then resolve
/// the live session it names. Handlers downstream get both the claims and the
/// session as extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let claims = token_data.claims;

    let session = state
        .sessions
        .get(claims.sid)
        .map_err(crate::store_unavailable)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}
