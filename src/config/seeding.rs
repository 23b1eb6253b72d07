use std::sync::Arc;

use anyhow::Result;

use crate::auth::password::hash_password;
use crate::models::{Gym, User, UserRole};
use crate::repositories::{GymRepository, UserRepository};

/// Provisions a demo coach with an owned gym so a development environment
/// has something to link against. Gym provisioning proper happens outside
/// this service.
pub struct DatabaseSeeder {
    users: Arc<dyn UserRepository>,
    gyms: Arc<dyn GymRepository>,
}

impl DatabaseSeeder {
    pub fn new(users: Arc<dyn UserRepository>, gyms: Arc<dyn GymRepository>) -> Self {
        Self { users, gyms }
    }

    pub async fn seed_all(&self) -> Result<()> {
        tracing::info!("Starting database seeding...");

        let coach = self.seed_coach().await?;
        self.seed_gym(&coach).await?;

        tracing::info!("Database seeding completed!");
        Ok(())
    }

    async fn seed_coach(&self) -> Result<User> {
        let email = "coach@demo.gym";
        if let Some(existing) = self.users.find_by_email(email).await? {
            return Ok(existing);
        }

        let password_hash = hash_password("ChangeMe123!")?;
        let coach = User::create(
            email.to_string(),
            password_hash,
            "Demo Coach".to_string(),
            UserRole::Coach,
        );
        self.users.insert(&coach).await?;
        tracing::info!("Created demo coach");
        Ok(coach)
    }

    async fn seed_gym(&self, coach: &User) -> Result<()> {
        if self.gyms.find_by_owner(coach.id).await?.is_some() {
            return Ok(());
        }

        let gym = Gym::create(coach.id, "Demo Gym".to_string(), "DEMO-GYM-KEY".to_string());
        self.gyms.insert(&gym).await?;
        // The owner is also a member so the roster endpoints work for them.
        self.users.link_to_gym(coach.id, gym.id).await?;
        tracing::info!("Created demo gym");
        Ok(())
    }
}
