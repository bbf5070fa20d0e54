//! Minimal user entity referenced by parking events.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::UserId;

/// A registered user. Referenced by events, never mutated by the capacity
/// core.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique username chosen at signup.
    pub username: String,
    /// Signup timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with a fresh id.
    #[must_use]
    pub fn new(username: String) -> Self {
        Self {
            id: UserId::new(),
            username,
            created_at: Utc::now(),
        }
    }
}
