use std::sync::Arc;

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::UserProfile;
use crate::repositories::UserRepository;

/// Builds the full profile view for a user id.
#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        let user = self.users.find_by_id(user_id).await?.ok_or_else(|| {
            AppError::NotFound("the user for this token no longer exists".to_string())
        })?;
        Ok(UserProfile::from(user))
    }
}
