use std::sync::Arc;

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{DataCaptureRequest, RequestStatus, UserProfile, UserRole};
use crate::repositories::{GymRepository, RequestRepository, UserRepository};

/// Links an authenticated account to a gym by its registration key. Linking
/// is one-time per account; an athlete link also opens the pending approval
/// request owned by the gym's coach.
#[derive(Clone)]
pub struct GymLinkingService {
    users: Arc<dyn UserRepository>,
    gyms: Arc<dyn GymRepository>,
    requests: Arc<dyn RequestRepository>,
}

impl GymLinkingService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        gyms: Arc<dyn GymRepository>,
        requests: Arc<dyn RequestRepository>,
    ) -> Self {
        Self {
            users,
            gyms,
            requests,
        }
    }

    /// Each step is a hard precondition for the next. The association, the
    /// request creation and the re-read are not one transaction; instead
    /// each write is idempotent keyed on the user id, so a partially applied
    /// link can be re-run without duplicating state.
    pub async fn link(&self, user_id: Uuid, gym_key: &str) -> Result<UserProfile, AppError> {
        let gym = self
            .gyms
            .find_by_key(gym_key)
            .await?
            .ok_or_else(|| AppError::NotFound("the provided gym key is not valid".to_string()))?;

        // Guard only: an authenticated caller should always resolve.
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

        if user.gym.is_some() {
            return Err(AppError::Unprocessable(
                "this account is already linked to a gym".to_string(),
            ));
        }

        self.users.link_to_gym(user.id, gym.id).await?;

        if user.role == UserRole::Athlete {
            self.open_request_once(user.id, gym.owner_id).await?;
        }

        let updated = self
            .users
            .find_by_id(user.id)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

        Ok(UserProfile::from(updated))
    }

    /// Open the approval request unless a pending one already exists for
    /// this athlete. Keyed on the athlete id so the step can be retried.
    async fn open_request_once(&self, athlete_id: Uuid, coach_id: Uuid) -> Result<(), AppError> {
        if let Some(existing) = self.requests.find_latest_by_athlete(athlete_id).await? {
            if existing.status == RequestStatus::Pending {
                return Ok(());
            }
        }

        let request = DataCaptureRequest::open(athlete_id, coach_id);
        self.requests.insert(&request).await?;
        tracing::info!(
            athlete_id = %athlete_id,
            coach_id = %coach_id,
            "opened data capture request for linked athlete"
        );
        Ok(())
    }
}
