use axum::{
    extract::{Path, State},
    middleware,
    response::Json,
    routing::post,
    Extension, Router,
};
use uuid::Uuid;

use crate::auth::{jwt_auth_middleware, require_role, AuthUser, MessageResponse};
use crate::errors::AppError;
use crate::models::{AthleteProfileUpdate, UserRole};

use super::routes::AppState;

/// Coach-side approval of a linked athlete.
pub fn athlete_routes(state: AppState) -> Router {
    Router::new()
        .route("/:athlete_id/approve", post(approve_athlete))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            jwt_auth_middleware,
        ))
        .with_state(state)
}

#[tracing::instrument(skip(state, auth, attrs))]
async fn approve_athlete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(athlete_id): Path<Uuid>,
    Json(attrs): Json<AthleteProfileUpdate>,
) -> Result<Json<MessageResponse>, AppError> {
    require_role(&auth, &[UserRole::Coach])?;
    let response = state.approval.approve(auth.user_id, athlete_id, attrs).await?;
    Ok(Json(response))
}
