use std::sync::Arc;

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::auth::jwt::TokenCodec;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{MessageResponse, RegisterRequest, RegisteredUser, TokenPair};
use crate::errors::AppError;
use crate::models::User;
use crate::notifications::ResetTokenDelivery;
use crate::repositories::UserRepository;

/// Fixed acknowledgement for password-reset requests, returned whether or
/// not the account exists so the endpoint cannot be used for enumeration.
const RESET_REQUEST_ACK: &str =
    "If an account with this email exists, a password reset link has been sent.";

/// Credential validation and token lifecycle: registration, the password
/// grant, refresh rotation, logout and the password-reset flow.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: TokenCodec,
    reset_delivery: Arc<dyn ResetTokenDelivery>,
    client_id: String,
    client_secret: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: TokenCodec,
        reset_delivery: Arc<dyn ResetTokenDelivery>,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            users,
            tokens,
            reset_delivery,
            client_id,
            client_secret,
        }
    }

    /// Register a new user. The email must not already be in use.
    pub async fn register(&self, request: RegisterRequest) -> Result<RegisteredUser, AppError> {
        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Unprocessable(
                "the email address is already in use".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;
        let user = User::create(request.email, password_hash, request.name, request.role);
        self.users.insert(&user).await?;

        tracing::info!(user_id = %user.id, "registered new user");

        Ok(RegisteredUser {
            id: user.id,
            email: user.email,
        })
    }

    /// Gate for the password-grant flow: the caller must present the
    /// configured client identity.
    pub fn validate_client(&self, client_id: &str, client_secret: &str) -> bool {
        client_id == self.client_id && client_secret == self.client_secret
    }

    /// Look up a user by email and verify the password. Fails closed: an
    /// unknown email and a wrong password are indistinguishable to the
    /// caller.
    pub async fn validate_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(None);
        };
        if verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Sign a fresh access/refresh pair and persist a digest of the refresh
    /// token against the user. The stored slot holds a single digest, so
    /// every call here (login or refresh) invalidates the previously issued
    /// refresh token.
    pub async fn issue_token_pair(&self, user: &User) -> Result<TokenPair, AppError> {
        let access_token = self.tokens.sign_access_token(user)?;
        let refresh_token = self.tokens.sign_refresh_token(user.id)?;

        let digest = refresh_token_digest(&refresh_token);
        self.users
            .update_refresh_token(user.id, Some(&digest))
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens.access_token_ttl_seconds(),
        })
    }

    /// Validate a presented refresh token against the stored digest. Returns
    /// None when the user is gone, has logged out, or presents a rotated-out
    /// token.
    pub async fn validate_by_refresh_token(
        &self,
        user_id: Uuid,
        refresh_token: &str,
    ) -> Result<Option<User>, AppError> {
        let Some(user) = self.users.find_by_id(user_id).await? else {
            return Ok(None);
        };
        let Some(stored) = user.refresh_token_hash.as_deref() else {
            return Ok(None);
        };
        if refresh_token_digest(refresh_token) == stored {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Clear the stored refresh digest. This is the only revocation
    /// mechanism: already-issued access tokens stay valid until they expire.
    pub async fn logout(&self, user_id: Uuid) -> Result<MessageResponse, AppError> {
        self.users.update_refresh_token(user_id, None).await?;
        Ok(MessageResponse {
            message: "Session closed.".to_string(),
        })
    }

    /// Issue a short-lived reset token and hand it to the out-of-band
    /// delivery collaborator. The acknowledgement is identical whether or
    /// not the account exists.
    pub async fn request_password_reset(&self, email: &str) -> Result<MessageResponse, AppError> {
        if let Some(user) = self.users.find_by_email(email).await? {
            let reset_token = self.tokens.sign_reset_token(user.id)?;
            if let Err(err) = self.reset_delivery.deliver(&user.email, &reset_token).await {
                // Still return the fixed acknowledgement: a delivery failure
                // must not reveal whether the account exists.
                tracing::error!(error = %err, "failed to dispatch password reset token");
            }
        }

        Ok(MessageResponse {
            message: RESET_REQUEST_ACK.to_string(),
        })
    }

    /// Consume a reset token and store a new password digest. The token
    /// proved the account existed at issuance, so a missing subject here is
    /// a genuine NotFound rather than an unauthorized outcome.
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<MessageResponse, AppError> {
        let claims = self.tokens.verify_reset_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("invalid token".to_string()))?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("the user for this token no longer exists".to_string()))?;

        let password_hash = hash_password(new_password)?;
        self.users.update_password(user.id, &password_hash).await?;

        Ok(MessageResponse {
            message: "Password updated successfully.".to_string(),
        })
    }
}

/// Digest stored in the single refresh-token slot. The full token is hashed
/// so a store leak does not expose usable refresh tokens.
fn refresh_token_digest(refresh_token: &str) -> String {
    hex::encode(Sha256::digest(refresh_token.as_bytes()))
}
