use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{User, UserRole};

/// Payload type tag carried by password-reset tokens.
pub const PASSWORD_RESET_TOKEN_TYPE: &str = "password-reset";

/// Reset tokens are single-purpose and short-lived regardless of the
/// configured access token TTL.
const RESET_TOKEN_TTL_MINUTES: i64 = 15;

/// Access token payload: identity plus role for API authorization.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub email: String,
    pub rol: UserRole,
    pub iat: usize,
    pub exp: usize,
}

/// Refresh token payload: subject only.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/// Password-reset token payload: subject plus a purpose tag so an access
/// token can never be replayed into the reset endpoint.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ResetClaims {
    pub sub: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub iat: usize,
    pub exp: usize,
}

/// Signs and verifies the three token classes. Access and refresh tokens use
/// independent secrets and expirations; reset tokens share the access secret
/// but carry a purpose tag.
#[derive(Clone)]
pub struct TokenCodec {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_key", &"[REDACTED]")
            .field("refresh_key", &"[REDACTED]")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_token_ttl: Duration,
        refresh_token_ttl: Duration,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            access_token_ttl,
            refresh_token_ttl,
        }
    }

    pub fn sign_access_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            rol: user.role,
            iat: now.timestamp() as usize,
            exp: (now + self.access_token_ttl).timestamp() as usize,
        };
        Ok(encode(&Header::default(), &claims, &self.access_encoding)?)
    }

    pub fn sign_refresh_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.refresh_token_ttl).timestamp() as usize,
        };
        Ok(encode(&Header::default(), &claims, &self.refresh_encoding)?)
    }

    pub fn sign_reset_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = ResetClaims {
            sub: user_id.to_string(),
            token_type: PASSWORD_RESET_TOKEN_TYPE.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::minutes(RESET_TOKEN_TTL_MINUTES)).timestamp() as usize,
        };
        Ok(encode(&Header::default(), &claims, &self.access_encoding)?)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        decode::<AccessClaims>(token, &self.access_decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::Unauthorized("invalid token".to_string()),
            })
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, AppError> {
        decode::<RefreshClaims>(
            token,
            &self.refresh_decoding,
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|err| match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::Unauthorized("invalid token".to_string()),
        })
    }

    /// Verify a reset token. Any failure, including a valid signature with
    /// the wrong payload type, collapses to a single unauthorized outcome.
    pub fn verify_reset_token(&self, token: &str) -> Result<ResetClaims, AppError> {
        let claims = decode::<ResetClaims>(
            token,
            &self.access_decoding,
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|_| {
            AppError::Unauthorized("the reset token is invalid or has expired".to_string())
        })?;

        if claims.token_type != PASSWORD_RESET_TOKEN_TYPE {
            return Err(AppError::Unauthorized(
                "invalid token for this operation".to_string(),
            ));
        }

        Ok(claims)
    }

    pub fn access_token_ttl_seconds(&self) -> usize {
        self.access_token_ttl.num_seconds() as usize
    }
}

/// Extract bearer token from authorization header
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, AppError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::InvalidAuthHeaderFormat)?;
    if token.is_empty() {
        return Err(AppError::InvalidAuthHeaderFormat);
    }
    Ok(token)
}
