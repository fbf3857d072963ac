use axum::extract::{Path, State};
use axum::Extension;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::store::models::ClothingItem;
use crate::store::NewItem;
use crate::validation::{self, CreateItemBody, ValidJson};

/// GET /items - list every clothing item. Public.
pub async fn get_items(State(state): State<AppState>) -> ApiResult<Vec<ClothingItem>> {
    Ok(ApiResponse::ok(state.items.list().await?))
}

/// POST /items - create an item owned by the authenticated user.
pub async fn create_item(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidJson(body): ValidJson<CreateItemBody>,
) -> ApiResult<ClothingItem> {
    let input = validation::validate_new_item(body)?;

    let item = state
        .items
        .insert(NewItem {
            name: input.name,
            weather: input.weather,
            image_url: input.image_url,
            owner: auth_user.id,
        })
        .await?;

    Ok(ApiResponse::created(item))
}

/// DELETE /items/:itemId - owner only; anyone else gets 403 and the item
/// stays untouched.
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(item_id): Path<String>,
) -> ApiResult<Value> {
    let item_id = validation::validate_item_id(&item_id)?;

    let item = state
        .items
        .find_by_id(&item_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;

    if item.owner != auth_user.id {
        return Err(ApiError::forbidden("You can only delete your own items"));
    }

    if !state.items.delete(&item_id).await? {
        return Err(ApiError::not_found("Item not found"));
    }

    Ok(ApiResponse::ok(json!({ "message": "Item successfully deleted" })))
}

/// PUT /items/:itemId/likes - add the authenticated user to the like set.
/// Repeating the request is a no-op; the set never duplicates.
pub async fn like_item(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(item_id): Path<String>,
) -> ApiResult<ClothingItem> {
    let item_id = validation::validate_item_id(&item_id)?;

    let item = state
        .items
        .add_like(&item_id, &auth_user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;

    Ok(ApiResponse::ok(item))
}

/// DELETE /items/:itemId/likes - remove the authenticated user from the
/// like set. Removing an absent like succeeds.
pub async fn dislike_item(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(item_id): Path<String>,
) -> ApiResult<ClothingItem> {
    let item_id = validation::validate_item_id(&item_id)?;

    let item = state
        .items
        .remove_like(&item_id, &auth_user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Item not found"))?;

    Ok(ApiResponse::ok(item))
}
