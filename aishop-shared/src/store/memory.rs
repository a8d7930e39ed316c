/// In-memory identity store
///
/// Used by tests and local experiments. The whole map sits behind a single
/// `RwLock`, so the username check and the insert happen under one write
/// lock and concurrent signups cannot both claim a name.

use super::{StoreError, StoreResult, UserStore};
use crate::models::user::{CreateUser, UpdateProfile, User, DEFAULT_TRUST_SCORE};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Identity store holding users in a `HashMap`
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl MemoryUserStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a user inactive (test helper for disabled accounts)
    pub async fn deactivate(&self, id: Uuid) -> bool {
        match self.users.write().await.get_mut(&id) {
            Some(user) => {
                user.is_active = false;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, data: CreateUser) -> StoreResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.username == data.username) {
            return Err(StoreError::UsernameTaken(data.username));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            name: data.name,
            age: data.age,
            gender: data.gender,
            phone: data.phone,
            trust_score: DEFAULT_TRUST_SCORE,
            is_active: true,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        };

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn update_profile(&self, id: Uuid, data: UpdateProfile) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;

        Ok(users.get_mut(&id).map(|user| {
            user.name = data.name;
            user.age = data.age;
            user.gender = data.gender;
            user.phone = data.phone;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn record_login(&self, id: Uuid) -> StoreResult<()> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.last_login_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn count(&self) -> StoreResult<i64> {
        Ok(self.users.read().await.len() as i64)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
