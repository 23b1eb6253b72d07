use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::jwt::AccessClaims;
use crate::errors::AppError;
use crate::models::UserRole;

/// Authentication request models
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
}

/// OAuth2 password-grant request body.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub grant_type: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Authentication response models
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: usize,
}

#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Authenticated caller, decoded from the bearer access token and attached
/// to the request by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn from_claims(claims: &AccessClaims) -> Result<Self, AppError> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("invalid token".to_string()))?;
        Ok(Self {
            user_id,
            email: claims.email.clone(),
            role: claims.rol,
        })
    }
}
