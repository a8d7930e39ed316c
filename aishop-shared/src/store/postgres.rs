/// PostgreSQL-backed identity store

use super::{StoreError, StoreResult, UserStore};
use crate::db::pool::health_check;
use crate::models::user::{CreateUser, UpdateProfile, User};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

/// Unique constraint PostgreSQL generates for `users.username`
const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Identity store over a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_username_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(USERNAME_CONSTRAINT),
        _ => false,
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, data: CreateUser) -> StoreResult<User> {
        let username = data.username.clone();

        match User::create(&self.pool, data).await {
            Ok(user) => Ok(user),
            Err(err) if is_username_violation(&err) => {
                debug!(username = %username, "Username unique constraint violated");
                Err(StoreError::UsernameTaken(username))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn update_profile(&self, id: Uuid, data: UpdateProfile) -> StoreResult<Option<User>> {
        Ok(User::update_profile(&self.pool, id, data).await?)
    }

    async fn record_login(&self, id: Uuid) -> StoreResult<()> {
        User::update_last_login(&self.pool, id).await?;
        Ok(())
    }

    async fn count(&self) -> StoreResult<i64> {
        Ok(User::count(&self.pool).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
