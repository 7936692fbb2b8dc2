/// Task instance model and database operations
///
/// A task instance is one day's occurrence of a task. It tracks the target,
/// the submitted completion and the points awarded for it.
///
/// # State Machine
///
/// ```text
/// pending → done      (any permitted user, exactly once)
/// done    → done      (admin corrections only)
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TABLE task_instances (
///     id BLOB PRIMARY KEY NOT NULL,
///     task_id BLOB NOT NULL REFERENCES tasks(id) ON DELETE RESTRICT,
///     date TEXT NOT NULL,
///     target_value REAL NOT NULL DEFAULT 0.0 CHECK (target_value >= 0),
///     completed_value REAL,
///     completed_by BLOB REFERENCES users(id) ON DELETE SET NULL,
///     status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'done')),
///     points_awarded REAL,
///     completed_at TEXT,
///     created_at TEXT NOT NULL,
///     UNIQUE (task_id, date)
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Sqlite};
use uuid::Uuid;

const INSTANCE_COLUMNS: &str = "id, task_id, date, target_value, completed_value, completed_by, \
                                status, points_awarded, completed_at, created_at";

/// Completion status of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    /// Waiting for a completion value
    Pending,

    /// Completion recorded and points awarded
    Done,
}

impl InstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceStatus::Pending => "pending",
            InstanceStatus::Done => "done",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, InstanceStatus::Done)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskInstance {
    pub id: Uuid,

    pub task_id: Uuid,

    /// Calendar day this instance belongs to
    pub date: NaiveDate,

    /// Target amount of units (≥ 0)
    pub target_value: f64,

    /// Submitted amount; None while pending
    pub completed_value: Option<f64>,

    /// User who submitted the completion
    pub completed_by: Option<Uuid>,

    pub status: InstanceStatus,

    /// Points granted for the completion; None while pending
    pub points_awarded: Option<f64>,

    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

/// Fields written together when a completion is recorded
#[derive(Debug, Clone, Copy)]
pub struct CompletionRecord {
    pub completed_value: f64,
    pub completed_by: Uuid,
    pub points_awarded: f64,
}

/// Awarded points of one user on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserPoints {
    pub user_id: Option<Uuid>,

    /// None when the completing user no longer resolves
    pub user_name: Option<String>,

    pub points: f64,

    /// Number of completed instances counted
    pub completed: i64,
}

impl TaskInstance {
    /// Inserts a pending instance unless one exists for `(task_id, date)`
    ///
    /// A single statement, so concurrent callers never hold a read lock they
    /// must later upgrade. Returns None when the day already had an instance.
    pub async fn insert_if_absent<'e, E>(
        executor: E,
        task_id: Uuid,
        date: NaiveDate,
        target_value: f64,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let instance = sqlx::query_as::<_, TaskInstance>(&format!(
            "INSERT INTO task_instances (id, task_id, date, target_value, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (task_id, date) DO NOTHING
             RETURNING {INSTANCE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(task_id)
        .bind(date)
        .bind(target_value)
        .bind(InstanceStatus::Pending)
        .bind(Utc::now())
        .fetch_optional(executor)
        .await?;

        Ok(instance)
    }

    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let instance = sqlx::query_as::<_, TaskInstance>(&format!(
            "SELECT {INSTANCE_COLUMNS} FROM task_instances WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(instance)
    }

    pub async fn find_by_task_and_date<'e, E>(
        executor: E,
        task_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let instance = sqlx::query_as::<_, TaskInstance>(&format!(
            "SELECT {INSTANCE_COLUMNS} FROM task_instances WHERE task_id = ?1 AND date = ?2"
        ))
        .bind(task_id)
        .bind(date)
        .fetch_optional(executor)
        .await?;

        Ok(instance)
    }

    /// Lists every instance of a day, oldest first
    pub async fn list_by_date<'e, E>(executor: E, date: NaiveDate) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let instances = sqlx::query_as::<_, TaskInstance>(&format!(
            "SELECT {INSTANCE_COLUMNS} FROM task_instances WHERE date = ?1 ORDER BY created_at, id"
        ))
        .bind(date)
        .fetch_all(executor)
        .await?;

        Ok(instances)
    }

    /// Writes a completion in a single statement
    ///
    /// All four completion fields and `completed_at` change together. Unless
    /// `overwrite_done` is set the row must still be pending; None is returned
    /// when the instance is missing or was completed in the meantime.
    pub async fn record_completion<'e, E>(
        executor: E,
        id: Uuid,
        record: CompletionRecord,
        overwrite_done: bool,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let instance = sqlx::query_as::<_, TaskInstance>(&format!(
            "UPDATE task_instances
             SET completed_value = ?2,
                 completed_by = ?3,
                 status = ?4,
                 points_awarded = ?5,
                 completed_at = ?6
             WHERE id = ?1 AND (status = ?7 OR ?8)
             RETURNING {INSTANCE_COLUMNS}"
        ))
        .bind(id)
        .bind(record.completed_value)
        .bind(record.completed_by)
        .bind(InstanceStatus::Done)
        .bind(record.points_awarded)
        .bind(Utc::now())
        .bind(InstanceStatus::Pending)
        .bind(overwrite_done)
        .fetch_optional(executor)
        .await?;

        Ok(instance)
    }

    /// Sums awarded points per completing user for a day
    ///
    /// Only completed instances count. Highest total first.
    pub async fn points_by_user<'e, E>(
        executor: E,
        date: NaiveDate,
    ) -> Result<Vec<UserPoints>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query_as::<_, UserPoints>(
            r#"
            SELECT ti.completed_by AS user_id,
                   u.name AS user_name,
                   TOTAL(ti.points_awarded) AS points,
                   COUNT(*) AS completed
            FROM task_instances ti
            LEFT JOIN users u ON u.id = ti.completed_by
            WHERE ti.date = ?1 AND ti.status = ?2
            GROUP BY ti.completed_by, u.name
            ORDER BY points DESC, u.name COLLATE NOCASE
            "#,
        )
        .bind(date)
        .bind(InstanceStatus::Done)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }
}
