use axum::{extract::State, response::Json, routing::post, Router};
use uuid::Uuid;

use crate::auth::{RefreshTokenRequest, TokenPair, TokenRequest};
use crate::errors::AppError;

use super::routes::AppState;

/// OAuth2-style token issuance: the password grant and refresh rotation.
pub fn oauth_routes(state: AppState) -> Router {
    Router::new()
        .route("/token", post(token))
        .route("/token/refresh", post(refresh_token))
        .with_state(state)
}

/// Password grant: client identity first, then user credentials, then a
/// fresh pair. Both credential failures collapse to a single unauthorized
/// answer.
#[tracing::instrument(skip(state, request))]
async fn token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenPair>, AppError> {
    if request.grant_type != "password" {
        return Err(AppError::UnsupportedGrantType);
    }

    if !state
        .auth
        .validate_client(&request.client_id, &request.client_secret)
    {
        return Err(AppError::Unauthorized("invalid client".to_string()));
    }

    let user = state
        .auth
        .validate_credentials(&request.username, &request.password)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid user credentials".to_string()))?;

    let pair = state.auth.issue_token_pair(&user).await?;
    Ok(Json(pair))
}

/// Exchange a refresh token for a new pair. Issuing the new pair rotates
/// the stored digest, so the presented token cannot be replayed.
#[tracing::instrument(skip(state, request))]
async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let claims = state.tokens.verify_refresh_token(&request.refresh_token)?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("invalid token".to_string()))?;

    let user = state
        .auth
        .validate_by_refresh_token(user_id, &request.refresh_token)
        .await?
        .ok_or_else(|| {
            AppError::Unauthorized("refresh token is invalid or has been revoked".to_string())
        })?;

    let pair = state.auth.issue_token_pair(&user).await?;
    Ok(Json(pair))
}
