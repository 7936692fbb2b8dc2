/// Points accounting.
///
/// Points for a completion are `completed_value * points_per_unit`, unrounded.
/// Missing inputs fall back explicitly: no value counts as 0.0, and a missing
/// or non-positive rate counts as 1.0. A submitted value of 0.0 is a real
/// value worth 0 points, not "missing".

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::{authorization, context::AuthContext};
use crate::error::{CoreError, CoreResult};
use crate::models::{
    task::{Task, DEFAULT_POINTS_PER_UNIT},
    task_instance::{CompletionRecord, TaskInstance, UserPoints},
};

/// Computes the points earned for a completion
///
/// Never fails; see the module docs for the fallbacks.
pub fn compute_points(completed_value: Option<f64>, points_per_unit: Option<f64>) -> f64 {
    let value = completed_value.unwrap_or(0.0);
    let rate = match points_per_unit {
        Some(rate) if rate.is_finite() && rate > 0.0 => rate,
        _ => DEFAULT_POINTS_PER_UNIT,
    };

    value * rate
}

/// Checks a submitted completion or target amount
pub(crate) fn validate_amount(field: &str, value: f64) -> CoreResult<()> {
    if !value.is_finite() {
        return Err(CoreError::invalid(field, "Must be a finite number"));
    }
    if value < 0.0 {
        return Err(CoreError::invalid(field, "Must not be negative"));
    }

    Ok(())
}

/// Records a completion for an instance and awards its points
///
/// Value, completing user, status and points are written by one guarded
/// UPDATE, so they change together or not at all. A regular user may only complete a pending instance of a task
/// visible to them; admins may also correct completed ones.
///
/// # Errors
///
/// - `Validation` for a negative or non-finite value
/// - `NotFound` when the instance or its task is missing
/// - `Permission` when the actor may not complete this instance, including
///   when another user completed it first
pub async fn complete_instance(
    pool: &SqlitePool,
    ctx: &AuthContext,
    instance_id: Uuid,
    completed_value: f64,
) -> CoreResult<TaskInstance> {
    validate_amount("completed_value", completed_value)?;

    let instance = TaskInstance::find_by_id(pool, instance_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Task instance", instance_id))?;

    let task = Task::find_by_id(pool, instance.task_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Task", instance.task_id))?;

    if let Err(err) = authorization::require_completion_allowed(ctx, &instance, &task) {
        warn!(
            user_id = %ctx.user_id,
            instance_id = %instance_id,
            error = %err,
            "Completion rejected"
        );
        return Err(err.into());
    }

    let points_awarded = compute_points(Some(completed_value), Some(task.points_per_unit));
    let record = CompletionRecord {
        completed_value,
        completed_by: ctx.user_id,
        points_awarded,
    };

    // The only write. Its status guard rejects a completion that lost the
    // race to another user between the read above and this statement.
    let updated = TaskInstance::record_completion(pool, instance_id, record, ctx.is_admin())
        .await?
        .ok_or(authorization::AuthzError::AlreadyCompleted(instance_id))?;

    info!(
        user_id = %ctx.user_id,
        instance_id = %instance_id,
        task_id = %task.id,
        completed_value,
        points_awarded,
        corrected = instance.status.is_done(),
        "Task instance completed"
    );

    Ok(updated)
}

/// Total points awarded per user on a day, highest first
pub async fn daily_points(pool: &SqlitePool, date: NaiveDate) -> CoreResult<Vec<UserPoints>> {
    let points = TaskInstance::points_by_user(pool, date).await?;

    debug!(%date, users = points.len(), "Daily points aggregated");

    Ok(points)
}
