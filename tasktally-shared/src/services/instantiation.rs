/// Daily instantiation.
///
/// Turns a task into the instance for a given day. Creating the same
/// `(task, date)` twice never produces a second row: the insert is a single
/// `ON CONFLICT DO NOTHING` statement against the `UNIQUE (task_id, date)`
/// constraint, and a skipped insert is reported as `AlreadyExists`.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use super::accounting::validate_amount;
use crate::auth::{authorization, context::AuthContext};
use crate::error::{CoreError, CoreResult};
use crate::models::{task::Task, task_instance::TaskInstance};

/// Result of [`ensure_instance`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "instance", rename_all = "snake_case")]
pub enum EnsureOutcome {
    /// A new pending instance was written
    Created(TaskInstance),

    /// An instance already existed; nothing was written
    AlreadyExists(TaskInstance),
}

impl EnsureOutcome {
    pub fn instance(&self) -> &TaskInstance {
        match self {
            EnsureOutcome::Created(instance) | EnsureOutcome::AlreadyExists(instance) => instance,
        }
    }

    pub fn into_instance(self) -> TaskInstance {
        match self {
            EnsureOutcome::Created(instance) | EnsureOutcome::AlreadyExists(instance) => instance,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, EnsureOutcome::Created(_))
    }
}

/// Counts from a whole-day sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub created: usize,
    pub already_existing: usize,
}

/// Makes sure `task_id` has an instance on `date`
///
/// `target_value` defaults to 0.0. Admins may instantiate any task; other
/// users only tasks visible to them.
///
/// # Errors
///
/// - `Validation` for a negative or non-finite target
/// - `NotFound` when the task does not exist
/// - `Permission` when the task is not visible to the actor
pub async fn ensure_instance(
    pool: &SqlitePool,
    ctx: &AuthContext,
    task_id: Uuid,
    date: NaiveDate,
    target_value: Option<f64>,
) -> CoreResult<EnsureOutcome> {
    let target_value = target_value.unwrap_or(0.0);
    validate_amount("target_value", target_value)?;

    let task = Task::find_by_id(pool, task_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Task", task_id))?;

    authorization::require_task_visible(ctx, &task)?;

    let outcome = insert_once(pool, task_id, date, target_value).await?;

    if outcome.was_created() {
        info!(
            user_id = %ctx.user_id,
            task_id = %task_id,
            %date,
            target_value,
            "Task instance created"
        );
    } else {
        debug!(task_id = %task_id, %date, "Task instance already exists");
    }

    Ok(outcome)
}

/// Ensures every task has an instance on `date`
///
/// System-level sweep with no actor; callers restrict who may trigger it.
pub async fn instantiate_day(pool: &SqlitePool, date: NaiveDate) -> CoreResult<DaySummary> {
    let tasks = Task::list(pool).await?;
    let mut summary = DaySummary::default();

    for task in &tasks {
        match insert_once(pool, task.id, date, 0.0).await? {
            EnsureOutcome::Created(_) => summary.created += 1,
            EnsureOutcome::AlreadyExists(_) => summary.already_existing += 1,
        }
    }

    info!(
        %date,
        tasks = tasks.len(),
        created = summary.created,
        already_existing = summary.already_existing,
        "Day instantiated"
    );

    Ok(summary)
}

async fn insert_once(
    pool: &SqlitePool,
    task_id: Uuid,
    date: NaiveDate,
    target_value: f64,
) -> CoreResult<EnsureOutcome> {
    if let Some(instance) =
        TaskInstance::insert_if_absent(pool, task_id, date, target_value).await?
    {
        return Ok(EnsureOutcome::Created(instance));
    }

    // Rows are never deleted, so the conflicting instance is still there
    let existing = TaskInstance::find_by_task_and_date(pool, task_id, date)
        .await?
        .ok_or(CoreError::Database(sqlx::Error::RowNotFound))?;

    Ok(EnsureOutcome::AlreadyExists(existing))
}
