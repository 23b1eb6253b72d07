use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::events::{AthleteApproved, DomainEvent, EventBus};
use crate::notifications::PushSender;
use crate::repositories::UserRepository;

/// Subscriber that turns approval events into push notifications. Runs on
/// its own task; every failure here is logged and swallowed so nothing
/// reaches the approval flow that triggered the event.
#[derive(Clone)]
pub struct NotificationHandler {
    users: Arc<dyn UserRepository>,
    push: Arc<dyn PushSender>,
}

impl NotificationHandler {
    pub fn new(users: Arc<dyn UserRepository>, push: Arc<dyn PushSender>) -> Self {
        Self { users, push }
    }

    /// Subscribe to the bus and consume events until it closes.
    pub fn spawn(self, bus: &EventBus) -> JoinHandle<()> {
        let mut receiver = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(DomainEvent::AthleteApproved(event)) => {
                        self.handle_athlete_approved(event).await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "notification handler lagged behind the event bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    pub async fn handle_athlete_approved(&self, event: AthleteApproved) {
        tracing::info!(athlete_id = %event.athlete_id, "handling athlete approval event");

        let athlete = match self.users.find_by_id(event.athlete_id).await {
            Ok(Some(athlete)) => athlete,
            Ok(None) => {
                tracing::error!(
                    athlete_id = %event.athlete_id,
                    "athlete not found while sending the approval notification"
                );
                return;
            }
            Err(err) => {
                tracing::error!(
                    athlete_id = %event.athlete_id,
                    error = %err,
                    "failed to load athlete for the approval notification"
                );
                return;
            }
        };

        // No registered device is a valid terminal state, not an error.
        let Some(device_token) = athlete.device_token.as_deref() else {
            tracing::warn!(
                athlete_id = %athlete.id,
                "athlete has no registered device token, skipping notification"
            );
            return;
        };

        let title = "Your account has been approved!";
        let body = format!(
            "Congratulations, {}! Your coach has approved your account. You can start logging your training now.",
            athlete.name
        );

        match self.push.send(device_token, title, &body).await {
            Ok(()) => {
                tracing::info!(athlete_id = %athlete.id, "approval notification sent");
            }
            Err(err) => {
                tracing::error!(
                    athlete_id = %athlete.id,
                    error = %err,
                    "failed to send the approval notification"
                );
            }
        }
    }
}
