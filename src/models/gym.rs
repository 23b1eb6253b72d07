use serde::Serialize;
use uuid::Uuid;

use crate::models::{User, UserRole};

/// A gym owned by a single coach or admin. The registration key is the
/// shared secret athletes present when linking; it must be unique across
/// gyms and only changes through key rotation.
#[derive(Debug, Clone)]
pub struct Gym {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub registration_key: String,
}

impl Gym {
    pub fn create(owner_id: Uuid, name: String, registration_key: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            registration_key,
        }
    }
}

/// Member row for the gym roster listing. Athletes expose their level once
/// a profile exists.
#[derive(Debug, Clone, Serialize)]
pub struct GymMember {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub level: Option<String>,
}

impl From<User> for GymMember {
    fn from(user: User) -> Self {
        let level = user
            .athlete_profile
            .as_ref()
            .and_then(|profile| profile.level.clone());
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            level,
        }
    }
}

/// Registration key payload for the gym key endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct GymKeyResponse {
    pub registration_key: String,
}
