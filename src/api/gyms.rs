use axum::{
    extract::{Path, State},
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{jwt_auth_middleware, require_role, AuthUser};
use crate::errors::AppError;
use crate::models::{GymMember, UserProfile, UserRole};

use super::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct LinkGymRequest {
    pub gym_key: String,
}

/// Gym linking and the member roster.
pub fn gym_routes(state: AppState) -> Router {
    Router::new()
        .route("/link", post(link_gym))
        .route("/:gym_id/members", get(gym_members))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            jwt_auth_middleware,
        ))
        .with_state(state)
}

/// Link the caller's account to a gym by registration key.
#[tracing::instrument(skip(state, auth, request))]
async fn link_gym(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<LinkGymRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state.linking.link(auth.user_id, &request.gym_key).await?;
    Ok(Json(profile))
}

/// List the members of a gym (coaches and admins only).
#[tracing::instrument(skip(state, auth))]
async fn gym_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(gym_id): Path<Uuid>,
) -> Result<Json<Vec<GymMember>>, AppError> {
    require_role(&auth, &[UserRole::Coach, UserRole::Admin])?;
    let members = state.membership.members(auth.user_id, gym_id).await?;
    Ok(Json(members))
}
