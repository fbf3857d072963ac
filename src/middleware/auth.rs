use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::ObjectId;

/// Rendered for every authentication failure. Absence, malformed headers,
/// forgery and expiry all look the same to the caller.
const AUTHORIZATION_REQUIRED: &str = "Authorization Required";

/// Authenticated identity extracted from a verified bearer token, attached
/// to the request extensions for the rest of the request.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: ObjectId,
}

/// Bearer-token authentication middleware. Either an [`AuthUser`] ends up
/// in the request extensions and the chain continues, or the request is
/// rejected with 401 - never both, never neither.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized(AUTHORIZATION_REQUIRED))?;

    let claims = auth::verify_token(&state.config.security, token)
        .map_err(|_| ApiError::unauthorized(AUTHORIZATION_REQUIRED))?;

    let user_id: ObjectId = claims
        .sub
        .parse()
        .map_err(|_| ApiError::unauthorized(AUTHORIZATION_REQUIRED))?;

    request.extensions_mut().insert(AuthUser { id: user_id });
    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
