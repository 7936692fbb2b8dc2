/// Task model and database operations
///
/// A task is a reusable definition of work with a point-per-unit rate. Its
/// targeting fields are independent in storage:
///
/// - `is_global`: visible to every user
/// - `assigned_to`: visible to one user
/// - `assigned_group_id`: visible to the members of one group
/// - none of the above: visible to admins only
///
/// Visibility treats them as a priority chain, see
/// [`crate::auth::authorization::can_view_task`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BLOB PRIMARY KEY NOT NULL,
///     title TEXT NOT NULL,
///     description TEXT,
///     is_global INTEGER NOT NULL DEFAULT 0,
///     assigned_to BLOB REFERENCES users(id) ON DELETE SET NULL,
///     assigned_group_id BLOB REFERENCES user_groups(id) ON DELETE SET NULL,
///     points_per_unit REAL NOT NULL DEFAULT 1.0 CHECK (points_per_unit > 0),
///     unit_name TEXT,
///     created_by BLOB REFERENCES users(id) ON DELETE SET NULL,
///     created_at TEXT NOT NULL
/// );
/// ```
///
/// Deleting a task is refused while it has instances (`ON DELETE RESTRICT`
/// on `task_instances.task_id`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Sqlite};
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, title, description, is_global, assigned_to, assigned_group_id, \
                            points_per_unit, unit_name, created_by, created_at";

/// Default points awarded per completed unit
pub const DEFAULT_POINTS_PER_UNIT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,

    pub title: String,

    pub description: Option<String>,

    /// Visible to all users regardless of group
    pub is_global: bool,

    /// Single assigned user
    pub assigned_to: Option<Uuid>,

    /// Assigned group
    pub assigned_group_id: Option<Uuid>,

    /// Points per completed unit (always > 0)
    pub points_per_unit: f64,

    /// Unit label, e.g. "pages"
    pub unit_name: Option<String>,

    /// Admin who created the task
    pub created_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub is_global: bool,
    pub assigned_to: Option<Uuid>,
    pub assigned_group_id: Option<Uuid>,
    pub points_per_unit: f64,
    pub unit_name: Option<String>,
    pub created_by: Option<Uuid>,
}

impl Task {
    /// Display title, falling back to a placeholder when the task is unknown
    pub fn display_title(task: Option<&Task>, task_id: Uuid) -> String {
        match task {
            Some(task) => task.title.clone(),
            None => format!("Task #{}", task_id),
        }
    }

    pub async fn create<'e, E>(executor: E, data: CreateTask) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (id, title, description, is_global, assigned_to, assigned_group_id,
                                points_per_unit, unit_name, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(data.title)
        .bind(data.description)
        .bind(data.is_global)
        .bind(data.assigned_to)
        .bind(data.assigned_group_id)
        .bind(data.points_per_unit)
        .bind(data.unit_name)
        .bind(data.created_by)
        .bind(Utc::now())
        .fetch_one(executor)
        .await?;

        Ok(task)
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(task)
    }

    /// Lists all tasks, oldest first
    pub async fn list<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at, title"
        ))
        .fetch_all(executor)
        .await?;

        Ok(tasks)
    }

    /// Counts the instances a task owns
    pub async fn count_instances<'e, E>(executor: E, id: Uuid) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM task_instances WHERE task_id = ?1")
            .bind(id)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }

    /// Deletes a task
    ///
    /// Fails with a foreign key violation while instances exist.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
