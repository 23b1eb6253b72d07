use std::sync::Arc;

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{GymKeyResponse, UserRole};
use crate::repositories::GymRepository;

/// Read and rotate a gym's registration key.
#[derive(Clone)]
pub struct GymKeyService {
    gyms: Arc<dyn GymRepository>,
}

impl GymKeyService {
    pub fn new(gyms: Arc<dyn GymRepository>) -> Self {
        Self { gyms }
    }

    /// Admins own their gym; coaches reach it through membership.
    pub async fn get_key(
        &self,
        requester_id: Uuid,
        role: UserRole,
    ) -> Result<GymKeyResponse, AppError> {
        let gym = match role {
            UserRole::Admin => self.gyms.find_by_owner(requester_id).await?,
            _ => self.gyms.find_by_member(requester_id).await?,
        };

        let gym = gym.ok_or_else(|| {
            AppError::NotFound("no gym associated with this user".to_string())
        })?;

        Ok(GymKeyResponse {
            registration_key: gym.registration_key,
        })
    }

    pub async fn rotate_key(
        &self,
        owner_id: Uuid,
        new_key: &str,
    ) -> Result<GymKeyResponse, AppError> {
        let gym = self.gyms.update_key(owner_id, new_key).await?;
        tracing::info!(gym_id = %gym.id, "rotated gym registration key");
        Ok(GymKeyResponse {
            registration_key: gym.registration_key,
        })
    }
}
