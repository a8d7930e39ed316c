/// Identity store abstraction
///
/// Handlers talk to the identity store through the [`UserStore`] trait so the
/// same router runs against PostgreSQL in production and an in-memory map
/// in tests.
///
/// # Implementations
///
/// - [`PgUserStore`]: PostgreSQL via sqlx
/// - [`MemoryUserStore`]: `HashMap` behind a `tokio::sync::RwLock`
///
/// # Example
///
/// ```no_run
/// use aishop_shared::models::user::CreateUser;
/// use aishop_shared::store::{MemoryUserStore, UserStore};
///
/// # async fn example() -> Result<(), aishop_shared::store::StoreError> {
/// let store = MemoryUserStore::new();
/// let user = store.create(CreateUser::new("minji", "minji@example.com", "$argon2id$...")).await?;
/// assert!(store.find_by_username("minji").await?.is_some());
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

use crate::models::user::{CreateUser, UpdateProfile, User};
use async_trait::async_trait;
use uuid::Uuid;

/// Errors returned by identity store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another account already uses this username
    #[error("Username already exists: {0}")]
    UsernameTaken(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations on user accounts
///
/// There is intentionally no delete operation: accounts are never removed.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user
    ///
    /// Fails with [`StoreError::UsernameTaken`] when the username is in use,
    /// in which case nothing is written.
    async fn create(&self, data: CreateUser) -> StoreResult<User>;

    /// Looks up a user by ID
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Looks up a user by exact username
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Overwrites the editable profile fields
    async fn update_profile(&self, id: Uuid, data: UpdateProfile) -> StoreResult<Option<User>>;

    /// Records a successful login
    async fn record_login(&self, id: Uuid) -> StoreResult<()>;

    /// Number of stored users
    async fn count(&self) -> StoreResult<i64>;

    /// Verifies the backing storage is reachable
    async fn ping(&self) -> StoreResult<()>;
}
