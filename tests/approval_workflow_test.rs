use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use uuid::Uuid;

use gym_identity::errors::AppError;
use gym_identity::events::{AthleteApproved, DomainEvent, EventBus};
use gym_identity::models::{RequestStatus, UserRole};
use gym_identity::notifications::NotificationHandler;
use gym_identity::repositories::{RequestRepository, UserRepository};
use gym_identity::services::{ApprovalService, GymLinkingService, RequestService};

mod common;
use common::*;

#[cfg(test)]
mod approval_workflow_tests {
    use super::*;

    struct Workflow {
        store: Arc<InMemoryStore>,
        bus: EventBus,
        linking: GymLinkingService,
        approval: ApprovalService,
    }

    fn workflow() -> Workflow {
        let store = InMemoryStore::new();
        let bus = EventBus::new();
        let linking = GymLinkingService::new(store.clone(), store.clone(), store.clone());
        let approval = ApprovalService::new(store.clone(), store.clone(), bus.clone());
        Workflow {
            store,
            bus,
            linking,
            approval,
        }
    }

    /// Register a coach with a gym plus a linked athlete with a pending
    /// request.
    async fn linked_athlete(w: &Workflow) -> (gym_identity::models::User, gym_identity::models::User) {
        let coach = create_user(&w.store, "c@x.com", "Carla", UserRole::Coach).await;
        provision_gym(&w.store, &coach, "Iron Temple", "K1").await;
        let athlete = create_user(&w.store, "a@x.com", "Ana", UserRole::Athlete).await;
        w.linking.link(athlete.id, "K1").await.unwrap();
        (coach, athlete)
    }

    #[tokio::test]
    async fn test_approve_writes_profile_and_completes_request() {
        let w = workflow();
        let (coach, athlete) = linked_athlete(&w).await;
        let mut events = w.bus.subscribe();

        w.approval
            .approve(coach.id, athlete.id, profile_attrs("Principiante", 170, 65.0))
            .await
            .unwrap();

        let stored = w.store.find_by_id(athlete.id).await.unwrap().unwrap();
        let profile = stored.athlete_profile.expect("profile must exist after approval");
        assert_eq!(profile.level.as_deref(), Some("Principiante"));
        assert_eq!(profile.height_cm, Some(170));
        assert_eq!(profile.weight_kg, Some(65.0));

        let request = w
            .store
            .find_latest_by_athlete(athlete.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.status, RequestStatus::Completed);

        let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("approval must publish an event")
            .unwrap();
        let DomainEvent::AthleteApproved(event) = event;
        assert_eq!(event.athlete_id, athlete.id);
    }

    #[tokio::test]
    async fn test_approve_without_request_fails_not_found() {
        let w = workflow();
        let coach = create_user(&w.store, "c@x.com", "Carla", UserRole::Coach).await;

        let result = w
            .approval
            .approve(coach.id, Uuid::new_v4(), profile_attrs("Principiante", 170, 65.0))
            .await;
        assert_matches!(result, Err(AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_approve_by_non_owner_coach_fails_forbidden() {
        let w = workflow();
        let (_, athlete) = linked_athlete(&w).await;
        let other_coach = create_user(&w.store, "c2@x.com", "Cruz", UserRole::Coach).await;

        let result = w
            .approval
            .approve(other_coach.id, athlete.id, profile_attrs("Principiante", 170, 65.0))
            .await;
        assert_matches!(result, Err(AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_approve_is_exactly_once() {
        let w = workflow();
        let (coach, athlete) = linked_athlete(&w).await;

        w.approval
            .approve(coach.id, athlete.id, profile_attrs("Principiante", 170, 65.0))
            .await
            .unwrap();

        let second = w
            .approval
            .approve(coach.id, athlete.id, profile_attrs("Avanzado", 180, 80.0))
            .await;
        assert_matches!(second, Err(AppError::Unprocessable(_)));

        // The first call's attributes persist.
        let stored = w.store.find_by_id(athlete.id).await.unwrap().unwrap();
        let profile = stored.athlete_profile.unwrap();
        assert_eq!(profile.level.as_deref(), Some("Principiante"));
        assert_eq!(profile.height_cm, Some(170));
    }

    #[tokio::test]
    async fn test_approval_notifies_registered_device() {
        let w = workflow();
        let (coach, athlete) = linked_athlete(&w).await;
        w.store.set_device_token(athlete.id, "device-token-1");

        let push = RecordingPushSender::new();
        NotificationHandler::new(w.store.clone(), push.clone()).spawn(&w.bus);

        w.approval
            .approve(coach.id, athlete.id, profile_attrs("Principiante", 170, 65.0))
            .await
            .unwrap();

        // The handler runs on its own task; give it a moment.
        let mut sent = Vec::new();
        for _ in 0..100 {
            sent = push.sent();
            if !sent.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].device_token, "device-token-1");
        assert!(sent[0].title.contains("approved"));
        assert!(sent[0].body.contains("Ana"));
    }

    #[tokio::test]
    async fn test_notification_skipped_without_device_token() {
        let w = workflow();
        let (_, athlete) = linked_athlete(&w).await;

        let push = RecordingPushSender::new();
        let handler = NotificationHandler::new(w.store.clone(), push.clone());

        handler.handle_athlete_approved(AthleteApproved::new(athlete.id)).await;

        assert!(push.sent().is_empty());
    }

    #[tokio::test]
    async fn test_notification_for_missing_athlete_is_non_fatal() {
        let w = workflow();
        let push = RecordingPushSender::new();
        let handler = NotificationHandler::new(w.store.clone(), push.clone());

        handler
            .handle_athlete_approved(AthleteApproved::new(Uuid::new_v4()))
            .await;

        assert!(push.sent().is_empty());
    }

    #[tokio::test]
    async fn test_notification_transport_failure_is_swallowed() {
        let w = workflow();
        let (_, athlete) = linked_athlete(&w).await;
        w.store.set_device_token(athlete.id, "device-token-1");

        let push = RecordingPushSender::new();
        push.fail_next_send();
        let handler = NotificationHandler::new(w.store.clone(), push.clone());

        // Must not panic or propagate.
        handler.handle_athlete_approved(AthleteApproved::new(athlete.id)).await;

        assert!(push.sent().is_empty());
    }

    /// The end-to-end story: registration, password grant, linking, the
    /// coach's pending queue, approval and the exactly-once guarantee.
    #[tokio::test]
    async fn test_full_registration_to_approval_scenario() {
        let w = workflow();
        let reset_delivery = RecordingResetDelivery::new();
        let auth = auth_service(&w.store, &reset_delivery);
        let pending_queue = RequestService::new(w.store.clone() as Arc<dyn RequestRepository>);

        // Register athlete A and coach C; G is provisioned for C with key K1.
        let athlete = create_user(&w.store, "a@x.com", "Ana", UserRole::Athlete).await;
        let coach = create_user(&w.store, "c@x.com", "Carla", UserRole::Coach).await;
        provision_gym(&w.store, &coach, "Iron Temple", "K1").await;

        // A logs in through the password grant.
        assert!(auth.validate_client(TEST_CLIENT_ID, TEST_CLIENT_SECRET));
        let logged_in = auth
            .validate_credentials("a@x.com", TEST_PASSWORD)
            .await
            .unwrap()
            .expect("credentials must validate");
        let pair = auth.issue_token_pair(&logged_in).await.unwrap();
        let claims = test_codec().verify_access_token(&pair.access_token).unwrap();
        assert_eq!(claims.sub, athlete.id.to_string());

        // A links to the gym with K1.
        w.linking.link(athlete.id, "K1").await.unwrap();

        // C sees exactly one pending request for A.
        let pending = pending_queue.pending_for_coach(coach.id).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].athlete_id, athlete.id);
        assert_eq!(pending[0].athlete_email.as_deref(), Some("a@x.com"));

        // C approves with the profile attributes.
        w.approval
            .approve(coach.id, athlete.id, profile_attrs("Principiante", 170, 65.0))
            .await
            .unwrap();

        let stored = w.store.find_by_id(athlete.id).await.unwrap().unwrap();
        let profile = stored.athlete_profile.unwrap();
        assert_eq!(profile.level.as_deref(), Some("Principiante"));
        assert_eq!(profile.height_cm, Some(170));
        assert_eq!(profile.weight_kg, Some(65.0));

        // The queue drains and a second approval attempt is rejected.
        assert!(pending_queue.pending_for_coach(coach.id).await.unwrap().is_empty());
        assert_matches!(
            w.approval
                .approve(coach.id, athlete.id, profile_attrs("Principiante", 170, 65.0))
                .await,
            Err(AppError::Unprocessable(_))
        );
    }
}
