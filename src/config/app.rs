use anyhow::Result;
use chrono::Duration;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub oauth_client_id: String,
    pub oauth_client_secret: String,
    pub seed_demo_data: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let access_token_secret = env::var("JWT_SECRET")
            .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string());
        let refresh_token_secret = env::var("JWT_REFRESH_SECRET")
            .unwrap_or_else(|_| "your-refresh-secret-change-in-production".to_string());
        let access_token_ttl_minutes = env::var("JWT_ACCESS_TOKEN_EXPIRATION_MINUTES")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .unwrap_or(15);
        let refresh_token_ttl_days = env::var("JWT_REFRESH_TOKEN_EXPIRATION_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let oauth_client_id =
            env::var("OAUTH_CLIENT_ID").unwrap_or_else(|_| "gym-app".to_string());
        let oauth_client_secret =
            env::var("OAUTH_CLIENT_SECRET").unwrap_or_else(|_| "gym-app-secret".to_string());

        let seed_demo_data = env::var("SEED_DEMO_DATA")
            .map(|value| value == "true" || value == "1")
            .unwrap_or(false);

        Ok(AppConfig {
            host,
            port,
            environment,
            access_token_secret,
            refresh_token_secret,
            access_token_ttl_minutes,
            refresh_token_ttl_days,
            oauth_client_id,
            oauth_client_secret,
            seed_demo_data,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn access_token_ttl(&self) -> Duration {
        Duration::minutes(self.access_token_ttl_minutes)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::days(self.refresh_token_ttl_days)
    }
}
