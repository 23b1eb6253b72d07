#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use gym_identity::api::AppState;
use gym_identity::auth::password::hash_password;
use gym_identity::auth::{AuthService, TokenCodec};
use gym_identity::config::AppConfig;
use gym_identity::errors::AppError;
use gym_identity::events::EventBus;
use gym_identity::models::{
    AthleteProfile, AthleteProfileUpdate, DataCaptureRequest, Gym, GymSummary, RequestStatus, User,
    UserRole,
};
use gym_identity::notifications::{PushSender, ResetTokenDelivery};
use gym_identity::repositories::{GymRepository, RequestRepository, UserRepository};

pub const TEST_CLIENT_ID: &str = "test-client";
pub const TEST_CLIENT_SECRET: &str = "test-client-secret";
pub const TEST_PASSWORD: &str = "Password123!";

static INIT: Once = Once::new();

/// Initialize test logging
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

#[derive(Default)]
struct StoreInner {
    users: HashMap<Uuid, User>,
    gyms: Vec<Gym>,
    memberships: Vec<(Uuid, Uuid)>, // (user_id, gym_id)
    requests: Vec<DataCaptureRequest>,
}

/// In-memory implementation of all three repository ports, backing the
/// workflow and router tests without a database.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_device_token(&self, user_id: Uuid, device_token: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.get_mut(&user_id) {
            user.device_token = Some(device_token.to_string());
        }
    }

    pub fn request_count(&self) -> usize {
        self.inner.lock().unwrap().requests.len()
    }

    fn enrich(inner: &StoreInner, user: &User) -> User {
        let mut user = user.clone();
        if let Some((_, gym_id)) = inner
            .memberships
            .iter()
            .find(|(member_id, _)| *member_id == user.id)
        {
            if let Some(gym) = inner.gyms.iter().find(|gym| gym.id == *gym_id) {
                user.gym = Some(GymSummary {
                    id: gym.id,
                    name: gym.name.clone(),
                });
            }
        }
        user
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .values()
            .find(|user| user.email == email)
            .map(|user| Self::enrich(&inner, user)))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.get(&id).map(|user| Self::enrich(&inner, user)))
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.values().any(|existing| existing.email == user.email) {
            return Err(AppError::Unprocessable(
                "the email address is already in use".to_string(),
            ));
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.get_mut(&user_id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn update_refresh_token(
        &self,
        user_id: Uuid,
        refresh_token_hash: Option<&str>,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.get_mut(&user_id) {
            user.refresh_token_hash = refresh_token_hash.map(str::to_string);
        }
        Ok(())
    }

    async fn link_to_gym(&self, user_id: Uuid, gym_id: Uuid) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.memberships.contains(&(user_id, gym_id)) {
            inner.memberships.push((user_id, gym_id));
        }
        Ok(())
    }

    async fn upsert_athlete_profile(
        &self,
        athlete_id: Uuid,
        attrs: &AthleteProfileUpdate,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.get_mut(&athlete_id) {
            user.athlete_profile = Some(AthleteProfile {
                level: Some(attrs.level.clone()),
                height_cm: Some(attrs.height_cm),
                weight_kg: Some(attrs.weight_kg),
                stance: attrs.stance.clone(),
                allergies: attrs.allergies.clone(),
                emergency_contact_name: attrs.emergency_contact_name.clone(),
                emergency_contact_phone: attrs.emergency_contact_phone.clone(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl GymRepository for InMemoryStore {
    async fn insert(&self, gym: &Gym) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .gyms
            .iter()
            .any(|existing| existing.registration_key == gym.registration_key)
        {
            return Err(AppError::Unprocessable(
                "the registration key is already in use".to_string(),
            ));
        }
        inner.gyms.push(gym.clone());
        Ok(())
    }

    async fn find_by_key(&self, registration_key: &str) -> Result<Option<Gym>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .gyms
            .iter()
            .find(|gym| gym.registration_key == registration_key)
            .cloned())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Option<Gym>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.gyms.iter().find(|gym| gym.owner_id == owner_id).cloned())
    }

    async fn find_by_member(&self, member_id: Uuid) -> Result<Option<Gym>, AppError> {
        let inner = self.inner.lock().unwrap();
        let gym_id = inner
            .memberships
            .iter()
            .find(|(user_id, _)| *user_id == member_id)
            .map(|(_, gym_id)| *gym_id);
        Ok(gym_id.and_then(|id| inner.gyms.iter().find(|gym| gym.id == id).cloned()))
    }

    async fn members(&self, gym_id: Uuid) -> Result<Vec<User>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .memberships
            .iter()
            .filter(|(_, member_gym_id)| *member_gym_id == gym_id)
            .filter_map(|(user_id, _)| inner.users.get(user_id).cloned())
            .collect())
    }

    async fn update_key(&self, owner_id: Uuid, new_key: &str) -> Result<Gym, AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .gyms
            .iter()
            .any(|gym| gym.owner_id != owner_id && gym.registration_key == new_key)
        {
            return Err(AppError::Unprocessable(
                "the registration key is already in use".to_string(),
            ));
        }
        let gym = inner
            .gyms
            .iter_mut()
            .find(|gym| gym.owner_id == owner_id)
            .ok_or_else(|| AppError::NotFound("no gym owned by this user".to_string()))?;
        gym.registration_key = new_key.to_string();
        Ok(gym.clone())
    }
}

#[async_trait]
impl RequestRepository for InMemoryStore {
    async fn insert(&self, request: &DataCaptureRequest) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(request.clone());
        Ok(())
    }

    async fn find_latest_by_athlete(
        &self,
        athlete_id: Uuid,
    ) -> Result<Option<DataCaptureRequest>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .requests
            .iter()
            .filter(|request| request.athlete_id == athlete_id)
            .last()
            .cloned())
    }

    async fn pending_for_coach(
        &self,
        coach_id: Uuid,
    ) -> Result<Vec<DataCaptureRequest>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut pending: Vec<DataCaptureRequest> = inner
            .requests
            .iter()
            .filter(|request| {
                request.coach_id == coach_id && request.status == RequestStatus::Pending
            })
            .cloned()
            .map(|mut request| {
                if let Some(athlete) = inner.users.get(&request.athlete_id) {
                    request.athlete_name = Some(athlete.name.clone());
                    request.athlete_email = Some(athlete.email.clone());
                }
                request
            })
            .collect();
        pending.reverse(); // newest first
        Ok(pending)
    }

    async fn update(&self, request: &DataCaptureRequest) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(stored) = inner
            .requests
            .iter_mut()
            .find(|stored| stored.id == request.id)
        {
            stored.status = request.status;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SentPush {
    pub device_token: String,
    pub title: String,
    pub body: String,
}

/// Push transport double that records every delivery and can be told to
/// fail the next send.
#[derive(Default)]
pub struct RecordingPushSender {
    sent: Mutex<Vec<SentPush>>,
    fail_next: AtomicBool,
}

impl RecordingPushSender {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<SentPush> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_next_send(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PushSender for RecordingPushSender {
    async fn send(&self, device_token: &str, title: &str, body: &str) -> anyhow::Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            anyhow::bail!("push transport unavailable");
        }
        self.sent.lock().unwrap().push(SentPush {
            device_token: device_token.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Reset-token delivery double that captures issued tokens.
#[derive(Default)]
pub struct RecordingResetDelivery {
    delivered: Mutex<Vec<(String, String)>>,
}

impl RecordingResetDelivery {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn delivered(&self) -> Vec<(String, String)> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResetTokenDelivery for RecordingResetDelivery {
    async fn deliver(&self, email: &str, reset_token: &str) -> anyhow::Result<()> {
        self.delivered
            .lock()
            .unwrap()
            .push((email.to_string(), reset_token.to_string()));
        Ok(())
    }
}

pub fn test_codec() -> TokenCodec {
    TokenCodec::new(
        "test_access_secret",
        "test_refresh_secret",
        Duration::minutes(15),
        Duration::days(30),
    )
}

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        access_token_secret: "test_access_secret".to_string(),
        refresh_token_secret: "test_refresh_secret".to_string(),
        access_token_ttl_minutes: 15,
        refresh_token_ttl_days: 30,
        oauth_client_id: TEST_CLIENT_ID.to_string(),
        oauth_client_secret: TEST_CLIENT_SECRET.to_string(),
        seed_demo_data: false,
    }
}

pub fn auth_service(
    store: &Arc<InMemoryStore>,
    reset_delivery: &Arc<RecordingResetDelivery>,
) -> AuthService {
    AuthService::new(
        store.clone(),
        test_codec(),
        reset_delivery.clone(),
        TEST_CLIENT_ID.to_string(),
        TEST_CLIENT_SECRET.to_string(),
    )
}

pub fn app_state(store: &Arc<InMemoryStore>, bus: EventBus) -> AppState {
    AppState::new(
        store.clone(),
        store.clone(),
        store.clone(),
        bus,
        test_codec(),
        RecordingResetDelivery::new(),
        &test_config(),
    )
}

/// Insert a user directly, bypassing the registration endpoint.
pub async fn create_user(
    store: &Arc<InMemoryStore>,
    email: &str,
    name: &str,
    role: UserRole,
) -> User {
    let password_hash = hash_password(TEST_PASSWORD).unwrap();
    let user = User::create(email.to_string(), password_hash, name.to_string(), role);
    UserRepository::insert(store.as_ref(), &user).await.unwrap();
    user
}

/// Provision a gym owned by `owner` (provisioning happens outside the core,
/// so tests write straight to the store) and enroll the owner as a member.
pub async fn provision_gym(
    store: &Arc<InMemoryStore>,
    owner: &User,
    name: &str,
    registration_key: &str,
) -> Gym {
    let gym = Gym::create(owner.id, name.to_string(), registration_key.to_string());
    GymRepository::insert(store.as_ref(), &gym).await.unwrap();
    store.link_to_gym(owner.id, gym.id).await.unwrap();
    gym
}

pub fn profile_attrs(level: &str, height_cm: i32, weight_kg: f64) -> AthleteProfileUpdate {
    AthleteProfileUpdate {
        level: level.to_string(),
        height_cm,
        weight_kg,
        stance: None,
        allergies: None,
        emergency_contact_name: None,
        emergency_contact_phone: None,
    }
}
