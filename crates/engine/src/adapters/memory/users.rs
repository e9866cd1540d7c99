//! In-memory credential store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use bookshelf_core::{Email, UserId};

use crate::context::Context;
use crate::models::User;
use crate::providers::{CredentialStore, StoreError};

use super::check_deadline;

/// Users keyed by ID, with unique emails.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, ctx: &Context, email: &Email) -> Result<User, StoreError> {
        check_deadline(ctx)?;
        self.users
            .read()
            .await
            .values()
            .find(|user| &user.email == email)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user with email {email}")))
    }

    async fn save(&self, ctx: &Context, user: &User) -> Result<(), StoreError> {
        check_deadline(ctx)?;
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(StoreError::Conflict(format!("user {} already exists", user.id)));
        }
        if users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::Conflict(format!(
                "email {} already registered",
                user.email
            )));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn update(&self, ctx: &Context, user: &User) -> Result<(), StoreError> {
        check_deadline(ctx)?;
        let mut users = self.users.write().await;
        let Some(existing) = users.get_mut(&user.id) else {
            return Err(StoreError::NotFound(format!("user {}", user.id)));
        };
        *existing = user.clone();
        Ok(())
    }
}
