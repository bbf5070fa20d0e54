//! Concurrent user storage with register-if-absent signup.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::{User, UserId};
use crate::error::GatewayError;

#[derive(Debug, Default)]
struct UserMaps {
    by_id: HashMap<UserId, User>,
    by_name: HashMap<String, UserId>,
}

/// Central store for registered users.
///
/// Both lookup maps live behind one lock so signup stays atomic with
/// respect to the username uniqueness check.
#[derive(Debug, Default)]
pub struct UserRegistry {
    inner: RwLock<UserMaps>,
}

impl UserRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(UserMaps::default()),
        }
    }

    /// Registers a user under `username` unless one already exists.
    ///
    /// Returns the (existing or new) user and whether it was newly created.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] when the username is blank.
    pub async fn register_if_absent(&self, username: &str) -> Result<(User, bool), GatewayError> {
        if username.trim().is_empty() {
            return Err(GatewayError::InvalidInput("username is empty".to_string()));
        }

        let mut inner = self.inner.write().await;
        if let Some(id) = inner.by_name.get(username) {
            let existing = inner
                .by_id
                .get(id)
                .cloned()
                .ok_or_else(|| GatewayError::Internal("user maps out of sync".to_string()))?;
            return Ok((existing, false));
        }

        let user = User::new(username.to_string());
        inner.by_name.insert(username.to_string(), user.id);
        inner.by_id.insert(user.id, user.clone());
        Ok((user, true))
    }

    /// Returns `true` when a user with the given id exists.
    pub async fn contains(&self, id: UserId) -> bool {
        self.inner.read().await.by_id.contains_key(&id)
    }

    /// Returns the user with the given username.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] for an unknown username.
    pub async fn get_by_username(&self, username: &str) -> Result<User, GatewayError> {
        let inner = self.inner.read().await;
        inner
            .by_name
            .get(username)
            .and_then(|id| inner.by_id.get(id))
            .cloned()
            .ok_or_else(|| GatewayError::UserNotFound(username.to_string()))
    }

    /// Returns every registered user.
    pub async fn list(&self) -> Vec<User> {
        self.inner.read().await.by_id.values().cloned().collect()
    }

    /// Returns the number of registered users.
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    /// Returns `true` when no user is registered.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.by_id.is_empty()
    }
}
