use axum::{
    extract::{Request, State},
    http::{
        header::{HeaderName, AUTHORIZATION},
        HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use tower_http::cors::{Any, CorsLayer};

use crate::auth::jwt::{extract_bearer_token, TokenCodec};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::UserRole;

/// JWT authentication middleware: validates the bearer access token and
/// attaches the caller as an [`AuthUser`] request extension.
pub async fn jwt_auth_middleware(
    State(tokens): State<TokenCodec>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(AppError::MissingAuthHeader)?;

    let token = extract_bearer_token(auth_header)?;
    let claims = tokens.verify_access_token(token)?;
    let auth_user = AuthUser::from_claims(&claims)?;

    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Handler-level role guard. Authorization beyond the role (request
/// ownership, gym membership) stays in the services.
pub fn require_role(auth: &AuthUser, allowed: &[UserRole]) -> Result<(), AppError> {
    if allowed.contains(&auth.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "you do not have permission to perform this action".to_string(),
        ))
    }
}

/// CORS configuration for the API surface.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Security headers middleware
pub fn security_headers_layer() -> tower_http::set_header::SetResponseHeaderLayer<HeaderValue> {
    tower_http::set_header::SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    )
}
