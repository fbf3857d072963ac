//! Route table. Protected routes run the auth middleware before their
//! handler; everything else is public. Unmatched paths fall through to a
//! classified 404.

use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::handlers::{items, users};
use crate::middleware::require_auth;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/users/me",
            get(users::get_current_user).patch(users::update_current_user),
        )
        .route("/items", post(items::create_item))
        .route("/items/:itemId", delete(items::delete_item))
        .route(
            "/items/:itemId/likes",
            put(items::like_item).delete(items::dislike_item),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/signup", post(users::create_user))
        .route("/signin", post(users::login))
        .route("/items", get(items::get_items))
        .merge(protected)
        .fallback(fallback)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fallback() -> ApiError {
    ApiError::not_found("Requested resource not found")
}
