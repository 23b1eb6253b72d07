use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;

use crate::auth::{jwt_auth_middleware, require_role, AuthUser};
use crate::errors::AppError;
use crate::models::{GymKeyResponse, UserRole};

use super::routes::AppState;

/// Registration-key endpoints for gym staff.
pub fn profile_routes(state: AppState) -> Router {
    Router::new()
        .route("/gym/key", get(get_gym_key).patch(rotate_gym_key))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            jwt_auth_middleware,
        ))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RotateKeyRequest {
    new_key: String,
}

/// Read the registration key of the caller's gym (coaches and admins).
#[tracing::instrument(skip(state, auth))]
async fn get_gym_key(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<GymKeyResponse>, AppError> {
    require_role(&auth, &[UserRole::Coach, UserRole::Admin])?;
    let key = state.gym_keys.get_key(auth.user_id, auth.role).await?;
    Ok(Json(key))
}

/// Rotate the registration key of the gym the caller owns (admins only).
#[tracing::instrument(skip(state, auth, request))]
async fn rotate_gym_key(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<RotateKeyRequest>,
) -> Result<Json<GymKeyResponse>, AppError> {
    require_role(&auth, &[UserRole::Admin])?;
    let key = state
        .gym_keys
        .rotate_key(auth.user_id, &request.new_key)
        .await?;
    Ok(Json(key))
}
