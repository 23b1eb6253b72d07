use axum::{
    extract::{Path, State},
    middleware,
    response::Json,
    routing::get,
    Extension, Router,
};
use uuid::Uuid;

use crate::auth::{jwt_auth_middleware, AuthUser};
use crate::errors::AppError;
use crate::models::UserProfile;

use super::routes::AppState;

/// Profile views for the authenticated caller and for arbitrary ids.
pub fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/me", get(my_profile))
        .route("/:id", get(profile_by_id))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            jwt_auth_middleware,
        ))
        .with_state(state)
}

#[tracing::instrument(skip(state, auth))]
async fn my_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state.profile.get_profile(auth.user_id).await?;
    Ok(Json(profile))
}

#[tracing::instrument(skip(state))]
async fn profile_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state.profile.get_profile(id).await?;
    Ok(Json(profile))
}
