use std::sync::Arc;

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::PendingRequest;
use crate::repositories::RequestRepository;

/// Pending-queue queries for coaches.
#[derive(Clone)]
pub struct RequestService {
    requests: Arc<dyn RequestRepository>,
}

impl RequestService {
    pub fn new(requests: Arc<dyn RequestRepository>) -> Self {
        Self { requests }
    }

    pub async fn pending_for_coach(
        &self,
        coach_id: Uuid,
    ) -> Result<Vec<PendingRequest>, AppError> {
        let requests = self.requests.pending_for_coach(coach_id).await?;
        Ok(requests.into_iter().map(PendingRequest::from).collect())
    }
}
