/// Task definitions and the per-day board
///
/// Creating and deleting tasks is admin-only. Reads are filtered through
/// [`authorization::can_view_task`], so a hidden task looks the same as a
/// missing one to regular users.

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{
    authorization::{self, DailyEntry},
    context::AuthContext,
};
use crate::error::{CoreError, CoreResult};
use crate::models::{
    group::Group,
    task::{CreateTask, Task, DEFAULT_POINTS_PER_UNIT},
    task_instance::TaskInstance,
    user::User,
};

/// Input for creating a task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub is_global: bool,
    pub assigned_to: Option<Uuid>,
    pub assigned_group_id: Option<Uuid>,

    /// Defaults to 1.0 when absent
    pub points_per_unit: Option<f64>,

    pub unit_name: Option<String>,
}

/// Creates a task
///
/// # Errors
///
/// - `Permission` for non-admins
/// - `Validation` for an empty title or a non-positive rate
/// - `NotFound` when the assigned user or group does not exist
pub async fn create_task(pool: &SqlitePool, ctx: &AuthContext, data: NewTask) -> CoreResult<Task> {
    authorization::require_admin(ctx, "create tasks")?;

    let title = data.title.trim().to_string();
    if title.is_empty() {
        return Err(CoreError::invalid("title", "Title is required"));
    }

    let points_per_unit = data.points_per_unit.unwrap_or(DEFAULT_POINTS_PER_UNIT);
    if !points_per_unit.is_finite() || points_per_unit <= 0.0 {
        return Err(CoreError::invalid(
            "points_per_unit",
            "Must be a positive number",
        ));
    }

    if let Some(user_id) = data.assigned_to {
        User::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User", user_id))?;
    }

    if let Some(group_id) = data.assigned_group_id {
        Group::find_by_id(pool, group_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Group", group_id))?;
    }

    let task = Task::create(
        pool,
        CreateTask {
            title,
            description: non_blank(data.description),
            is_global: data.is_global,
            assigned_to: data.assigned_to,
            assigned_group_id: data.assigned_group_id,
            points_per_unit,
            unit_name: non_blank(data.unit_name),
            created_by: Some(ctx.user_id),
        },
    )
    .await?;

    info!(
        task_id = %task.id,
        admin_id = %ctx.user_id,
        is_global = task.is_global,
        points_per_unit = task.points_per_unit,
        "Task created"
    );

    Ok(task)
}

/// Lists the tasks visible to the actor
pub async fn list_tasks(pool: &SqlitePool, ctx: &AuthContext) -> CoreResult<Vec<Task>> {
    let tasks = Task::list(pool).await?;

    Ok(tasks
        .into_iter()
        .filter(|task| authorization::can_view_task(ctx, task))
        .collect())
}

/// Loads one task
///
/// Returns `NotFound` for tasks the actor may not see.
pub async fn get_task(pool: &SqlitePool, ctx: &AuthContext, task_id: Uuid) -> CoreResult<Task> {
    match Task::find_by_id(pool, task_id).await? {
        Some(task) if authorization::can_view_task(ctx, &task) => Ok(task),
        _ => Err(CoreError::not_found("Task", task_id)),
    }
}

/// Deletes a task that has no instances
///
/// # Errors
///
/// - `Permission` for non-admins
/// - `NotFound` for an unknown task
/// - `Conflict` while instances of the task exist
pub async fn delete_task(pool: &SqlitePool, ctx: &AuthContext, task_id: Uuid) -> CoreResult<()> {
    authorization::require_admin(ctx, "delete tasks")?;

    let mut tx = pool.begin().await?;

    let instances = Task::count_instances(&mut *tx, task_id).await?;
    if instances > 0 {
        return Err(CoreError::Conflict(format!(
            "Task {} still has {} instance(s)",
            task_id, instances
        )));
    }

    if !Task::delete(&mut *tx, task_id).await? {
        return Err(CoreError::not_found("Task", task_id));
    }

    tx.commit().await?;

    info!(task_id = %task_id, admin_id = %ctx.user_id, "Task deleted");
    Ok(())
}

/// The day's instances the actor may see, each with its task
///
/// Instances whose task no longer resolves are kept with `task: None`;
/// only admins get to see those.
pub async fn instances_for_date(
    pool: &SqlitePool,
    ctx: &AuthContext,
    date: NaiveDate,
) -> CoreResult<Vec<DailyEntry>> {
    let instances = TaskInstance::list_by_date(pool, date).await?;
    let tasks: HashMap<Uuid, Task> = Task::list(pool)
        .await?
        .into_iter()
        .map(|task| (task.id, task))
        .collect();

    let entries: Vec<DailyEntry> = instances
        .into_iter()
        .map(|instance| DailyEntry {
            task: tasks.get(&instance.task_id).cloned(),
            instance,
        })
        .collect();

    let total = entries.len();
    let visible = authorization::visible_instances(ctx, entries);

    debug!(
        user_id = %ctx.user_id,
        %date,
        total,
        visible = visible.len(),
        "Loaded daily instances"
    );

    Ok(visible)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
