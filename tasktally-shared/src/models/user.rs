/// User model and database operations
///
/// Users are created by an admin (or by the bootstrap step) and are never
/// deleted. The only mutation after creation is role/group reassignment.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BLOB PRIMARY KEY NOT NULL,
///     name TEXT NOT NULL,
///     email TEXT NOT NULL UNIQUE COLLATE NOCASE,
///     password_hash TEXT NOT NULL,
///     role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('admin', 'user')),
///     group_id BLOB REFERENCES user_groups(id) ON DELETE SET NULL,
///     created_at TEXT NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tasktally_shared::models::user::{User, CreateUser, UserRole};
/// use tasktally_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::in_memory()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     name: "Alice".to_string(),
///     email: "alice@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: UserRole::User,
///     group_id: None,
/// }).await?;
///
/// let found = User::find_by_email(&pool, "ALICE@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, group_id, created_at";

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full visibility and management rights
    Admin,

    /// Sees global, self-assigned and group tasks
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

/// User account
///
/// Passwords are stored as Argon2id hashes, never in plaintext, and the hash
/// is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address, stored trimmed and lower-cased
    pub email: String,

    /// Argon2id PHC string
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub role: UserRole,

    /// Group membership (at most one)
    pub group_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,

    /// Email address; normalized before storage
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    pub role: UserRole,

    pub group_id: Option<Uuid>,
}

/// Normalizes an email for storage and lookup
///
/// Emails are compared case-insensitively; trimming also keeps stray
/// whitespace from producing look-alike accounts.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns a unique violation if the email is already taken, or a foreign
    /// key violation if `group_id` does not exist.
    pub async fn create<'e, E>(executor: E, data: CreateUser) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, name, email, password_hash, role, group_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(data.name.trim())
        .bind(normalize_email(&data.email))
        .bind(data.password_hash)
        .bind(data.role)
        .bind(data.group_id)
        .bind(Utc::now())
        .fetch_one(executor)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email<'e, E>(
        executor: E,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(normalize_email(email))
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    /// Lists all users, ordered by name
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY name COLLATE NOCASE, email"
        ))
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts users holding the admin role
    pub async fn count_admins<'e, E>(executor: E) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?1")
            .bind(UserRole::Admin)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }

    /// Replaces a user's role and group
    ///
    /// Returns None if the user does not exist.
    pub async fn update_assignment<'e, E>(
        executor: E,
        id: Uuid,
        role: UserRole,
        group_id: Option<Uuid>,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = ?2, group_id = ?3
             WHERE id = ?1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(role)
        .bind(group_id)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }
}
