/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(150) NOT NULL UNIQUE,
///     email VARCHAR(254) NOT NULL,
///     name VARCHAR(50),
///     age INTEGER CHECK (age >= 0),
///     gender user_gender,
///     phone VARCHAR(20),
///     trust_score DOUBLE PRECISION NOT NULL DEFAULT 3.0,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use aishop_shared::models::user::{User, CreateUser};
/// use aishop_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser::new("minji", "minji@example.com", "$argon2id$...")).await?;
/// let found = User::find_by_username(&pool, "minji").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

/// Trust score every new account starts with
pub const DEFAULT_TRUST_SCORE: f64 = 3.0;

/// Columns selected for every user query
const USER_COLUMNS: &str = "id, username, email, name, age, gender, phone, trust_score, is_active, \
                            password_hash, created_at, updated_at, last_login_at";

/// Self-reported gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_gender")]
pub enum Gender {
    #[sqlx(rename = "M")]
    #[serde(rename = "M")]
    Male,

    #[sqlx(rename = "F")]
    #[serde(rename = "F")]
    Female,

    /// Other or not stated
    #[sqlx(rename = "U")]
    #[serde(rename = "U")]
    Unspecified,
}

impl Gender {
    /// All choices in display order
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Unspecified];

    /// Single-letter form code
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Unspecified => "U",
        }
    }

    /// Parses a form code (`M`, `F`, `U`)
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Gender::Male),
            "F" => Some(Gender::Female),
            "U" => Some(Gender::Unspecified),
            _ => None,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Unspecified => "Other / not stated",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// User account
///
/// Passwords are stored as Argon2id hashes, never in plaintext. The hash is
/// skipped when the user is serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Login name, unique across all users
    pub username: String,

    /// Contact email address
    pub email: String,

    /// Optional display name
    pub name: Option<String>,

    /// Optional age in years
    pub age: Option<i32>,

    /// Optional gender
    pub gender: Option<Gender>,

    /// Optional phone number
    pub phone: Option<String>,

    /// Reputation among shopping teams
    pub trust_score: f64,

    /// Inactive accounts cannot log in
    pub is_active: bool,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Name to greet the user with: display name if set, else username
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,

    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    pub name: Option<String>,

    pub age: Option<i32>,

    pub gender: Option<Gender>,

    pub phone: Option<String>,
}

impl CreateUser {
    /// Creates input with only the required fields set
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            name: None,
            age: None,
            gender: None,
            phone: None,
        }
    }
}

/// Editable profile fields
///
/// Every field is written, so `None` clears the stored value. Username and
/// password are not editable here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub name: Option<String>,

    pub age: Option<i32>,

    pub gender: Option<Gender>,

    pub phone: Option<String>,
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the username already exists (unique constraint
    /// `users_username_key`) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO users (username, email, password_hash, name, age, gender, phone, trust_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(data.username)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.name)
            .bind(data.age)
            .bind(data.gender)
            .bind(data.phone)
            .bind(DEFAULT_TRUST_SCORE)
            .fetch_one(pool)
            .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Finds a user by exact username
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable
    pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);

        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Overwrites the editable profile fields and bumps `updated_at`
    ///
    /// Returns the updated user, or None if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE users
            SET name = $2, age = $3, gender = $4, phone = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(data.name)
            .bind(data.age)
            .bind(data.gender)
            .bind(data.phone)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Updates the last login timestamp for a user
    ///
    /// Returns true if the user was found and updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts total number of users
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
