use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Completed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(RequestStatus::Pending),
            "completed" => Some(RequestStatus::Completed),
            _ => None,
        }
    }
}

/// Unit of work for the approval workflow: opened when an athlete links to a
/// gym, owned by the gym's coach, completed exactly once on approval.
#[derive(Debug, Clone)]
pub struct DataCaptureRequest {
    pub id: Uuid,
    pub athlete_id: Uuid,
    pub coach_id: Uuid,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
    // Denormalized from the athlete row for listings.
    pub athlete_name: Option<String>,
    pub athlete_email: Option<String>,
}

impl DataCaptureRequest {
    pub fn open(athlete_id: Uuid, coach_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            athlete_id,
            coach_id,
            status: RequestStatus::Pending,
            requested_at: Utc::now(),
            athlete_name: None,
            athlete_email: None,
        }
    }

    /// Transition Pending -> Completed. A request transitions once; a second
    /// attempt is rejected, not treated as a no-op.
    pub fn complete(&mut self) -> Result<(), AppError> {
        if self.status == RequestStatus::Completed {
            return Err(AppError::Unprocessable(
                "this request has already been processed".to_string(),
            ));
        }
        self.status = RequestStatus::Completed;
        Ok(())
    }
}

/// Listing view for a coach's pending queue.
#[derive(Debug, Clone, Serialize)]
pub struct PendingRequest {
    pub request_id: Uuid,
    pub athlete_id: Uuid,
    pub athlete_name: Option<String>,
    pub athlete_email: Option<String>,
    pub requested_at: DateTime<Utc>,
}

impl From<DataCaptureRequest> for PendingRequest {
    fn from(request: DataCaptureRequest) -> Self {
        Self {
            request_id: request.id,
            athlete_id: request.athlete_id,
            athlete_name: request.athlete_name,
            athlete_email: request.athlete_email,
            requested_at: request.requested_at,
        }
    }
}
