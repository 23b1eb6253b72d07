use std::sync::Arc;

use uuid::Uuid;

use crate::auth::MessageResponse;
use crate::errors::AppError;
use crate::events::{AthleteApproved, DomainEvent, EventBus};
use crate::models::AthleteProfileUpdate;
use crate::repositories::{RequestRepository, UserRepository};

/// Completes an athlete's pending request: writes the profile attributes,
/// transitions the request exactly once and publishes the approval event.
#[derive(Clone)]
pub struct ApprovalService {
    users: Arc<dyn UserRepository>,
    requests: Arc<dyn RequestRepository>,
    bus: EventBus,
}

impl ApprovalService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        requests: Arc<dyn RequestRepository>,
        bus: EventBus,
    ) -> Self {
        Self {
            users,
            requests,
            bus,
        }
    }

    /// Preconditions are checked in order and the first failure wins: the
    /// request must exist, it must belong to the calling coach, and it must
    /// not already be completed. The event publish is fire-and-forget; the
    /// caller gets its confirmation once persistence is done.
    pub async fn approve(
        &self,
        coach_id: Uuid,
        athlete_id: Uuid,
        attrs: AthleteProfileUpdate,
    ) -> Result<MessageResponse, AppError> {
        let mut request = self
            .requests
            .find_latest_by_athlete(athlete_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("no data capture request found for athlete {athlete_id}"))
            })?;

        if request.coach_id != coach_id {
            return Err(AppError::Forbidden(
                "you are not allowed to approve this athlete".to_string(),
            ));
        }

        request.complete()?;

        self.users.upsert_athlete_profile(athlete_id, &attrs).await?;
        self.requests.update(&request).await?;

        let delivered = self
            .bus
            .publish(DomainEvent::AthleteApproved(AthleteApproved::new(athlete_id)));
        tracing::debug!(athlete_id = %athlete_id, delivered, "published athlete approval event");

        Ok(MessageResponse {
            message: "Athlete approved and profile updated.".to_string(),
        })
    }
}
