use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::Json,
    routing::post,
    Extension, Router,
};

use crate::auth::{
    jwt_auth_middleware, AuthUser, ForgotPasswordRequest, MessageResponse, RegisterRequest,
    RegisteredUser, ResetPasswordRequest,
};
use crate::errors::AppError;

use super::routes::AppState;

/// Registration, password reset and logout.
pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route(
            "/logout",
            post(logout).route_layer(middleware::from_fn_with_state(
                state.tokens.clone(),
                jwt_auth_middleware,
            )),
        )
        .with_state(state)
}

/// Register a new user
#[tracing::instrument(skip(state, request))]
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisteredUser>), AppError> {
    let registered = state.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(registered)))
}

/// Request a password reset token; always answers with the same message.
#[tracing::instrument(skip(state, request))]
async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = state.auth.request_password_reset(&request.email).await?;
    Ok(Json(response))
}

/// Consume a reset token and set a new password.
#[tracing::instrument(skip(state, request))]
async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = state
        .auth
        .reset_password(&request.token, &request.new_password)
        .await?;
    Ok(Json(response))
}

/// Invalidate the caller's refresh token.
#[tracing::instrument(skip(state, auth))]
async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<MessageResponse>, AppError> {
    let response = state.auth.logout(auth.user_id).await?;
    Ok(Json(response))
}
