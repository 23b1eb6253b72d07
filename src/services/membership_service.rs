use std::sync::Arc;

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::GymMember;
use crate::repositories::GymRepository;

/// Gym roster queries.
#[derive(Clone)]
pub struct MembershipService {
    gyms: Arc<dyn GymRepository>,
}

impl MembershipService {
    pub fn new(gyms: Arc<dyn GymRepository>) -> Self {
        Self { gyms }
    }

    /// List the members of a gym. The requester must be a member of that
    /// gym themselves; ownership of the role check stays with the caller.
    pub async fn members(
        &self,
        requester_id: Uuid,
        gym_id: Uuid,
    ) -> Result<Vec<GymMember>, AppError> {
        let members = self.gyms.members(gym_id).await?;
        if members.is_empty() {
            return Ok(Vec::new());
        }

        if !members.iter().any(|member| member.id == requester_id) {
            return Err(AppError::Forbidden(
                "you do not have access to this gym's members".to_string(),
            ));
        }

        Ok(members.into_iter().map(GymMember::from).collect())
    }
}
