/// Group model and database operations
///
/// A group holds zero or more users and can be the target of tasks. Group
/// names are unique, compared case-insensitively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: Uuid,

    pub name: String,

    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Creates a new group
    ///
    /// # Errors
    ///
    /// Returns a unique violation if the name is already taken.
    pub async fn create<'e, E>(executor: E, name: &str) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO user_groups (id, name, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name.trim())
        .bind(Utc::now())
        .fetch_one(executor)
        .await?;

        Ok(group)
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, name, created_at FROM user_groups WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(group)
    }

    pub async fn find_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let group = sqlx::query_as::<_, Group>(
            "SELECT id, name, created_at FROM user_groups WHERE name = ?1",
        )
        .bind(name.trim())
        .fetch_optional(executor)
        .await?;

        Ok(group)
    }

    /// Lists all groups, ordered by name
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        let groups = sqlx::query_as::<_, Group>(
            "SELECT id, name, created_at FROM user_groups ORDER BY name COLLATE NOCASE",
        )
        .fetch_all(pool)
        .await?;

        Ok(groups)
    }
}
