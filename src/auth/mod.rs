// Authentication: password hashing, token codec, credential/token lifecycle
// and the HTTP auth middleware.

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;

pub use jwt::{extract_bearer_token, AccessClaims, RefreshClaims, ResetClaims, TokenCodec};
pub use middleware::{jwt_auth_middleware, require_role};
pub use models::{
    AuthUser, ForgotPasswordRequest, MessageResponse, RefreshTokenRequest, RegisterRequest,
    RegisteredUser, ResetPasswordRequest, TokenPair, TokenRequest,
};
pub use service::AuthService;
