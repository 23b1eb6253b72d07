use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User roles for role-based access control
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Athlete,
    Coach,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Athlete => "athlete",
            UserRole::Coach => "coach",
            UserRole::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "athlete" => Some(UserRole::Athlete),
            "coach" => Some(UserRole::Coach),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// Summary of the gym a user is linked to (at most one per account).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GymSummary {
    pub id: Uuid,
    pub name: String,
}

/// Physical/medical attributes of an athlete, populated on first coach
/// approval. Every field stays nullable until then.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AthleteProfile {
    pub level: Option<String>,
    pub height_cm: Option<i32>,
    pub weight_kg: Option<f64>,
    pub stance: Option<String>,
    pub allergies: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
}

/// Attributes written by the approval workflow (upsert semantics).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthleteProfileUpdate {
    pub level: String,
    pub height_cm: i32,
    pub weight_kg: f64,
    pub stance: Option<String>,
    pub allergies: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
}

/// Identity record as the repositories return it: the base row plus the
/// optional gym link and athlete profile.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub refresh_token_hash: Option<String>,
    pub device_token: Option<String>,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub gym: Option<GymSummary>,
    pub athlete_profile: Option<AthleteProfile>,
}

impl User {
    /// Build a brand-new user. The password digest is computed by the caller
    /// before construction; a fresh account has no refresh token, no gym and
    /// no athlete profile.
    pub fn create(email: String, password_hash: String, name: String, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            refresh_token_hash: None,
            device_token: None,
            name,
            role,
            created_at: Utc::now(),
            gym: None,
            athlete_profile: None,
        }
    }
}

/// Full profile view returned to authenticated callers. Never carries
/// password or token digests.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub gym: Option<GymSummary>,
    pub athlete_profile: Option<AthleteProfile>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            gym: user.gym,
            athlete_profile: user.athlete_profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_starts_unlinked() {
        let user = User::create(
            "athlete@example.com".to_string(),
            "digest".to_string(),
            "Ana".to_string(),
            UserRole::Athlete,
        );

        assert!(user.refresh_token_hash.is_none());
        assert!(user.gym.is_none());
        assert!(user.athlete_profile.is_none());
    }

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Athlete, UserRole::Coach, UserRole::Admin] {
            assert_eq!(UserRole::from_str(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::from_str("manager"), None);
    }

    #[test]
    fn test_profile_view_drops_secrets() {
        let user = User::create(
            "athlete@example.com".to_string(),
            "digest".to_string(),
            "Ana".to_string(),
            UserRole::Athlete,
        );
        let view = UserProfile::from(user.clone());

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("refresh_token_hash").is_none());
        assert_eq!(json["email"], user.email);
    }
}
