use axum::{extract::State, Extension};
use serde::Serialize;
use tokio::task;

use crate::auth;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::store::models::User;
use crate::store::NewUser;
use crate::validation::{self, SigninBody, SignupBody, UpdateProfileBody, ValidJson};

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /signup - register a new user.
///
/// The password is hashed on the blocking pool; the created user is
/// returned without it (the model never serializes the hash).
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<SignupBody>,
) -> ApiResult<User> {
    let input = validation::validate_signup(body)?;

    if state.users.find_by_email(&input.email).await?.is_some() {
        return Err(ApiError::conflict("A user with this email already exists"));
    }

    let password_hash = hash_password(input.password, state.config.security.bcrypt_cost).await?;

    let user = state
        .users
        .insert(NewUser {
            name: input.name,
            avatar: input.avatar,
            email: input.email,
            password_hash,
        })
        .await?;

    Ok(ApiResponse::created(user))
}

/// POST /signin - authenticate and hand out a bearer token.
///
/// Unknown email and wrong password produce the identical 401 so the
/// response does not reveal which one it was.
pub async fn login(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<SigninBody>,
) -> ApiResult<TokenResponse> {
    let credentials = validation::validate_signin(body)?;

    let Some(user) = state.users.find_by_email(&credentials.email).await? else {
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    let matched = verify_password(credentials.password, user.password_hash.clone()).await?;
    if !matched {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = auth::sign_token(&state.config.security, &user.id)?;
    Ok(ApiResponse::ok(TokenResponse { token }))
}

/// GET /users/me - the authenticated user's record.
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<User> {
    let user = state
        .users
        .find_by_id(&auth_user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::ok(user))
}

/// PATCH /users/me - update name and avatar.
pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidJson(body): ValidJson<UpdateProfileBody>,
) -> ApiResult<User> {
    let input = validation::validate_profile_update(body)?;

    let user = state
        .users
        .update_profile(&auth_user.id, input.name, input.avatar)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::ok(user))
}

async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ApiError::internal_server_error(format!("hashing task failed: {}", e)))?
        .map_err(|e| ApiError::internal_server_error(format!("password hashing failed: {}", e)))
}

async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ApiError::internal_server_error(format!("hashing task failed: {}", e)))?
        .map_err(|e| {
            ApiError::internal_server_error(format!("password verification failed: {}", e))
        })
}
