use std::sync::Arc;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::auth::middleware::{cors_layer, security_headers_layer};
use crate::auth::{AuthService, TokenCodec};
use crate::config::AppConfig;
use crate::events::EventBus;
use crate::notifications::ResetTokenDelivery;
use crate::repositories::{GymRepository, RequestRepository, UserRepository};
use crate::services::{
    ApprovalService, GymKeyService, GymLinkingService, MembershipService, ProfileService,
    RequestService,
};

use super::athletes::athlete_routes;
use super::auth::auth_routes;
use super::gyms::gym_routes;
use super::health::health_check;
use super::oauth::oauth_routes;
use super::profile::profile_routes;
use super::requests::request_routes;
use super::users::user_routes;

/// Everything the handlers need, built once at startup from the repository
/// ports, the token codec and the event bus.
#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenCodec,
    pub auth: AuthService,
    pub linking: GymLinkingService,
    pub approval: ApprovalService,
    pub membership: MembershipService,
    pub requests: RequestService,
    pub profile: ProfileService,
    pub gym_keys: GymKeyService,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        gyms: Arc<dyn GymRepository>,
        requests: Arc<dyn RequestRepository>,
        bus: EventBus,
        tokens: TokenCodec,
        reset_delivery: Arc<dyn ResetTokenDelivery>,
        config: &AppConfig,
    ) -> Self {
        let auth = AuthService::new(
            users.clone(),
            tokens.clone(),
            reset_delivery,
            config.oauth_client_id.clone(),
            config.oauth_client_secret.clone(),
        );

        Self {
            tokens,
            auth,
            linking: GymLinkingService::new(users.clone(), gyms.clone(), requests.clone()),
            approval: ApprovalService::new(users.clone(), requests.clone(), bus),
            membership: MembershipService::new(gyms.clone()),
            requests: RequestService::new(requests),
            profile: ProfileService::new(users),
            gym_keys: GymKeyService::new(gyms),
        }
    }
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/oauth", oauth_routes(state.clone()))
        .nest("/users", user_routes(state.clone()))
        .nest("/gyms", gym_routes(state.clone()))
        .nest("/requests", request_routes(state.clone()))
        .nest("/athletes", athlete_routes(state.clone()))
        .nest("/profile", profile_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security_headers_layer())
                .layer(cors_layer()),
        )
}
