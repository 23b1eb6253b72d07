use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use gym_identity::api::{create_routes, AppState};
use gym_identity::auth::TokenCodec;
use gym_identity::config::{run_migrations, AppConfig, DatabaseConfig, DatabaseSeeder};
use gym_identity::events::EventBus;
use gym_identity::notifications::{
    LoggingPushSender, LoggingResetDelivery, NotificationHandler, PushSender, ResetTokenDelivery,
};
use gym_identity::repositories::{
    GymRepository, PgGymRepository, PgRequestRepository, PgUserRepository, RequestRepository,
    UserRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    let db_config = DatabaseConfig::from_env()?;

    let pool = db_config.create_pool().await?;
    run_migrations(&pool).await?;

    let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
    let gyms: Arc<dyn GymRepository> = Arc::new(PgGymRepository::new(pool.clone()));
    let requests: Arc<dyn RequestRepository> = Arc::new(PgRequestRepository::new(pool));

    if config.seed_demo_data && config.is_development() {
        DatabaseSeeder::new(users.clone(), gyms.clone())
            .seed_all()
            .await?;
    }

    // The approval notification pipeline: bus -> handler -> push transport.
    let bus = EventBus::new();
    let push: Arc<dyn PushSender> = Arc::new(LoggingPushSender);
    NotificationHandler::new(users.clone(), push).spawn(&bus);

    let tokens = TokenCodec::new(
        &config.access_token_secret,
        &config.refresh_token_secret,
        config.access_token_ttl(),
        config.refresh_token_ttl(),
    );
    let reset_delivery: Arc<dyn ResetTokenDelivery> = Arc::new(LoggingResetDelivery);

    let state = AppState::new(users, gyms, requests, bus, tokens, reset_delivery, &config);
    let app = create_routes(state);

    let listener = TcpListener::bind(config.server_address()).await?;
    info!(
        "gym identity service listening on http://{}",
        config.server_address()
    );

    axum::serve(listener, app).await?;

    Ok(())
}
