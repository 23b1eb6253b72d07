use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    AthleteProfile, AthleteProfileUpdate, DataCaptureRequest, Gym, GymSummary, RequestStatus, User,
    UserRole,
};
use crate::repositories::{GymRepository, RequestRepository, UserRepository};

const USER_WITH_RELATIONS: &str = r#"
    SELECT u.id, u.email, u.password_hash, u.refresh_token_hash, u.device_token,
           u.name, u.role, u.created_at,
           g.id AS gym_id, g.name AS gym_name,
           p.user_id AS profile_user_id, p.level, p.height_cm, p.weight_kg,
           p.stance, p.allergies, p.emergency_contact_name, p.emergency_contact_phone
    FROM users u
    LEFT JOIN gym_members gm ON gm.user_id = u.id
    LEFT JOIN gyms g ON g.id = gm.gym_id
    LEFT JOIN athlete_profiles p ON p.user_id = u.id
"#;

/// Flat row for a user joined with its optional gym link and profile.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    refresh_token_hash: Option<String>,
    device_token: Option<String>,
    name: String,
    role: String,
    created_at: DateTime<Utc>,
    gym_id: Option<Uuid>,
    gym_name: Option<String>,
    profile_user_id: Option<Uuid>,
    level: Option<String>,
    height_cm: Option<i32>,
    weight_kg: Option<f64>,
    stance: Option<String>,
    allergies: Option<String>,
    emergency_contact_name: Option<String>,
    emergency_contact_phone: Option<String>,
}

impl UserRow {
    fn into_user(self) -> Result<User, AppError> {
        let role = UserRole::from_str(&self.role)
            .ok_or_else(|| anyhow::anyhow!("unknown role stored for user {}: {}", self.id, self.role))?;

        let gym = match (self.gym_id, self.gym_name) {
            (Some(id), Some(name)) => Some(GymSummary { id, name }),
            _ => None,
        };

        let athlete_profile = self.profile_user_id.map(|_| AthleteProfile {
            level: self.level,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            stance: self.stance,
            allergies: self.allergies,
            emergency_contact_name: self.emergency_contact_name,
            emergency_contact_phone: self.emergency_contact_phone,
        });

        Ok(User {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            refresh_token_hash: self.refresh_token_hash,
            device_token: self.device_token,
            name: self.name,
            role,
            created_at: self.created_at,
            gym,
            athlete_profile,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{USER_WITH_RELATIONS} WHERE u.email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{USER_WITH_RELATIONS} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, refresh_token_hash, device_token, name, role, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.refresh_token_hash)
        .bind(&user.device_token)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                AppError::Unprocessable("the email address is already in use".to_string())
            } else {
                AppError::Database(err)
            }
        })?;
        Ok(())
    }

    async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_refresh_token(
        &self,
        user_id: Uuid,
        refresh_token_hash: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET refresh_token_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(refresh_token_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn link_to_gym(&self, user_id: Uuid, gym_id: Uuid) -> Result<(), AppError> {
        // Idempotent: replaying a partially applied link must not duplicate
        // the membership.
        sqlx::query(
            "INSERT INTO gym_members (user_id, gym_id) VALUES ($1, $2)
             ON CONFLICT (user_id, gym_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(gym_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_athlete_profile(
        &self,
        athlete_id: Uuid,
        attrs: &AthleteProfileUpdate,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO athlete_profiles
                 (user_id, level, height_cm, weight_kg, stance, allergies,
                  emergency_contact_name, emergency_contact_phone)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (user_id) DO UPDATE SET
                 level = $2, height_cm = $3, weight_kg = $4, stance = $5,
                 allergies = $6, emergency_contact_name = $7, emergency_contact_phone = $8",
        )
        .bind(athlete_id)
        .bind(&attrs.level)
        .bind(attrs.height_cm)
        .bind(attrs.weight_kg)
        .bind(&attrs.stance)
        .bind(&attrs.allergies)
        .bind(&attrs.emergency_contact_name)
        .bind(&attrs.emergency_contact_phone)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GymRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    registration_key: String,
}

impl From<GymRow> for Gym {
    fn from(row: GymRow) -> Self {
        Gym {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            registration_key: row.registration_key,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgGymRepository {
    pool: PgPool,
}

impl PgGymRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GymRepository for PgGymRepository {
    async fn insert(&self, gym: &Gym) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO gyms (id, owner_id, name, registration_key) VALUES ($1, $2, $3, $4)",
        )
        .bind(gym.id)
        .bind(gym.owner_id)
        .bind(&gym.name)
        .bind(&gym.registration_key)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                AppError::Unprocessable("the registration key is already in use".to_string())
            } else {
                AppError::Database(err)
            }
        })?;
        Ok(())
    }

    async fn find_by_key(&self, registration_key: &str) -> Result<Option<Gym>, AppError> {
        let row = sqlx::query_as::<_, GymRow>(
            "SELECT id, owner_id, name, registration_key FROM gyms WHERE registration_key = $1",
        )
        .bind(registration_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Gym::from))
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Option<Gym>, AppError> {
        let row = sqlx::query_as::<_, GymRow>(
            "SELECT id, owner_id, name, registration_key FROM gyms WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Gym::from))
    }

    async fn find_by_member(&self, member_id: Uuid) -> Result<Option<Gym>, AppError> {
        let row = sqlx::query_as::<_, GymRow>(
            "SELECT g.id, g.owner_id, g.name, g.registration_key
             FROM gyms g
             JOIN gym_members gm ON gm.gym_id = g.id
             WHERE gm.user_id = $1",
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Gym::from))
    }

    async fn members(&self, gym_id: Uuid) -> Result<Vec<User>, AppError> {
        // Members keep their gym field empty here; callers already know
        // which gym they asked about.
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.email, u.password_hash, u.refresh_token_hash, u.device_token,
                    u.name, u.role, u.created_at,
                    NULL::uuid AS gym_id, NULL::text AS gym_name,
                    p.user_id AS profile_user_id, p.level, p.height_cm, p.weight_kg,
                    p.stance, p.allergies, p.emergency_contact_name, p.emergency_contact_phone
             FROM gym_members gm
             JOIN users u ON u.id = gm.user_id
             LEFT JOIN athlete_profiles p ON p.user_id = u.id
             WHERE gm.gym_id = $1
             ORDER BY u.created_at",
        )
        .bind(gym_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn update_key(&self, owner_id: Uuid, new_key: &str) -> Result<Gym, AppError> {
        let row = sqlx::query_as::<_, GymRow>(
            "UPDATE gyms SET registration_key = $2 WHERE owner_id = $1
             RETURNING id, owner_id, name, registration_key",
        )
        .bind(owner_id)
        .bind(new_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                AppError::Unprocessable("the registration key is already in use".to_string())
            } else {
                AppError::Database(err)
            }
        })?;

        row.map(Gym::from)
            .ok_or_else(|| AppError::NotFound("no gym owned by this user".to_string()))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RequestRow {
    id: Uuid,
    athlete_id: Uuid,
    coach_id: Uuid,
    status: String,
    requested_at: DateTime<Utc>,
    athlete_name: Option<String>,
    athlete_email: Option<String>,
}

impl RequestRow {
    fn into_request(self) -> Result<DataCaptureRequest, AppError> {
        let status = RequestStatus::from_str(&self.status).ok_or_else(|| {
            anyhow::anyhow!("unknown status stored for request {}: {}", self.id, self.status)
        })?;
        Ok(DataCaptureRequest {
            id: self.id,
            athlete_id: self.athlete_id,
            coach_id: self.coach_id,
            status,
            requested_at: self.requested_at,
            athlete_name: self.athlete_name,
            athlete_email: self.athlete_email,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PgRequestRepository {
    pool: PgPool,
}

impl PgRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestRepository for PgRequestRepository {
    async fn insert(&self, request: &DataCaptureRequest) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO data_capture_requests (id, athlete_id, coach_id, status, requested_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(request.id)
        .bind(request.athlete_id)
        .bind(request.coach_id)
        .bind(request.status.as_str())
        .bind(request.requested_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_latest_by_athlete(
        &self,
        athlete_id: Uuid,
    ) -> Result<Option<DataCaptureRequest>, AppError> {
        let row = sqlx::query_as::<_, RequestRow>(
            "SELECT r.id, r.athlete_id, r.coach_id, r.status, r.requested_at,
                    NULL::text AS athlete_name, NULL::text AS athlete_email
             FROM data_capture_requests r
             WHERE r.athlete_id = $1
             ORDER BY r.requested_at DESC
             LIMIT 1",
        )
        .bind(athlete_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(RequestRow::into_request).transpose()
    }

    async fn pending_for_coach(
        &self,
        coach_id: Uuid,
    ) -> Result<Vec<DataCaptureRequest>, AppError> {
        let rows = sqlx::query_as::<_, RequestRow>(
            "SELECT r.id, r.athlete_id, r.coach_id, r.status, r.requested_at,
                    u.name AS athlete_name, u.email AS athlete_email
             FROM data_capture_requests r
             JOIN users u ON u.id = r.athlete_id
             WHERE r.coach_id = $1 AND r.status = 'pending'
             ORDER BY r.requested_at DESC",
        )
        .bind(coach_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RequestRow::into_request).collect()
    }

    async fn update(&self, request: &DataCaptureRequest) -> Result<(), AppError> {
        sqlx::query("UPDATE data_capture_requests SET status = $2 WHERE id = $1")
            .bind(request.id)
            .bind(request.status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
