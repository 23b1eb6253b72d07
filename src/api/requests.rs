use axum::{extract::State, middleware, response::Json, routing::get, Extension, Router};

use crate::auth::{jwt_auth_middleware, require_role, AuthUser};
use crate::errors::AppError;
use crate::models::{PendingRequest, UserRole};

use super::routes::AppState;

/// Pending-approval queue for coaches.
pub fn request_routes(state: AppState) -> Router {
    Router::new()
        .route("/pending", get(pending_requests))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            jwt_auth_middleware,
        ))
        .with_state(state)
}

#[tracing::instrument(skip(state, auth))]
async fn pending_requests(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<PendingRequest>>, AppError> {
    require_role(&auth, &[UserRole::Coach])?;
    let pending = state.requests.pending_for_coach(auth.user_id).await?;
    Ok(Json(pending))
}
