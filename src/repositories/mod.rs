// Persistence ports. Workflows receive these as trait objects so the store
// can be swapped out (Postgres in production, in-memory fakes in tests).

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{AthleteProfileUpdate, DataCaptureRequest, Gym, User};

pub mod postgres;

pub use postgres::{PgGymRepository, PgRequestRepository, PgUserRepository};

/// Persistence operations for [`User`] records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn insert(&self, user: &User) -> Result<(), AppError>;

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), AppError>;

    /// Store or clear the single refresh-token digest slot.
    async fn update_refresh_token(
        &self,
        user_id: Uuid,
        refresh_token_hash: Option<&str>,
    ) -> Result<(), AppError>;

    /// Record the user <-> gym association.
    async fn link_to_gym(&self, user_id: Uuid, gym_id: Uuid) -> Result<(), AppError>;

    /// Write athlete profile attributes, creating the profile row if absent.
    async fn upsert_athlete_profile(
        &self,
        athlete_id: Uuid,
        attrs: &AthleteProfileUpdate,
    ) -> Result<(), AppError>;
}

/// Persistence operations for [`Gym`] records.
#[async_trait]
pub trait GymRepository: Send + Sync {
    async fn insert(&self, gym: &Gym) -> Result<(), AppError>;

    async fn find_by_key(&self, registration_key: &str) -> Result<Option<Gym>, AppError>;

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Option<Gym>, AppError>;

    async fn find_by_member(&self, member_id: Uuid) -> Result<Option<Gym>, AppError>;

    async fn members(&self, gym_id: Uuid) -> Result<Vec<User>, AppError>;

    /// Rotate the registration key of the gym owned by `owner_id`. Fails
    /// NotFound when the user owns no gym and UnprocessableState when the
    /// new key is already taken by another gym.
    async fn update_key(&self, owner_id: Uuid, new_key: &str) -> Result<Gym, AppError>;
}

/// Persistence operations for [`DataCaptureRequest`] records.
#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn insert(&self, request: &DataCaptureRequest) -> Result<(), AppError>;

    /// The athlete's most recent request, regardless of status, so the
    /// approval workflow can distinguish "never linked" from "already
    /// approved".
    async fn find_latest_by_athlete(
        &self,
        athlete_id: Uuid,
    ) -> Result<Option<DataCaptureRequest>, AppError>;

    /// Pending requests owned by a coach, newest first, with the athlete's
    /// name and email denormalized for listing.
    async fn pending_for_coach(&self, coach_id: Uuid)
        -> Result<Vec<DataCaptureRequest>, AppError>;

    async fn update(&self, request: &DataCaptureRequest) -> Result<(), AppError>;
}
