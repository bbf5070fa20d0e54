//! DTOs for user endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{User, UserId};

/// Request body for `POST /users/signup`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupRequest {
    /// Desired username; signup is idempotent per username.
    pub username: String,
}

/// User projection returned by read endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserDto {
    /// User identifier.
    #[schema(value_type = uuid::Uuid)]
    pub id: UserId,
    /// Unique username.
    pub username: String,
    /// Signup timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            created_at: user.created_at,
        }
    }
}
