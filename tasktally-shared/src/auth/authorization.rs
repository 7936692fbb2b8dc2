/// Authorization rules
///
/// Two roles exist: admins see and change everything; regular users see a
/// task when it is global, assigned to them, or assigned to their group.
///
/// # Visibility
///
/// ```text
/// admin                                   → visible
/// task.is_global                          → visible
/// task.assigned_to == user                → visible
/// task.assigned_group_id == user.group_id → visible (both set)
/// otherwise                               → hidden
/// ```
///
/// # Mutation
///
/// A regular user may submit a completion for a visible instance while it is
/// pending. Once done, only an admin may change it.
///
/// All checks here are pure; callers run them before reading or writing
/// protected rows.

use serde::Serialize;
use uuid::Uuid;

use super::context::AuthContext;
use crate::models::{task::Task, task_instance::TaskInstance};

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// Action reserved for admins
    #[error("Admin role required to {0}")]
    AdminRequired(&'static str),

    /// Task is not visible to the actor
    #[error("Not authorized to access task {0}")]
    TaskNotVisible(Uuid),

    /// Instance already completed; only admins may change it
    #[error("Task instance {0} is already completed")]
    AlreadyCompleted(Uuid),
}

/// One row of a day's board: an instance and its task, if it still resolves
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyEntry {
    pub instance: TaskInstance,
    pub task: Option<Task>,
}

impl DailyEntry {
    /// Title to show, with a placeholder for unresolved tasks
    pub fn title(&self) -> String {
        Task::display_title(self.task.as_ref(), self.instance.task_id)
    }
}

/// Fails unless the actor is an admin
///
/// `action` names what was attempted, e.g. "create tasks".
pub fn require_admin(ctx: &AuthContext, action: &'static str) -> Result<(), AuthzError> {
    if !ctx.is_admin() {
        return Err(AuthzError::AdminRequired(action));
    }

    Ok(())
}

/// Whether the actor may see a task
pub fn can_view_task(ctx: &AuthContext, task: &Task) -> bool {
    if ctx.is_admin() || task.is_global {
        return true;
    }

    if task.assigned_to == Some(ctx.user_id) {
        return true;
    }

    matches!(
        (task.assigned_group_id, ctx.group_id),
        (Some(task_group), Some(user_group)) if task_group == user_group
    )
}

/// Fails unless the actor may see the task
pub fn require_task_visible(ctx: &AuthContext, task: &Task) -> Result<(), AuthzError> {
    if !can_view_task(ctx, task) {
        return Err(AuthzError::TaskNotVisible(task.id));
    }

    Ok(())
}

/// Filters a day's entries down to what the actor may see
///
/// Admins get everything, including entries whose task no longer resolves.
pub fn visible_instances(ctx: &AuthContext, entries: Vec<DailyEntry>) -> Vec<DailyEntry> {
    if ctx.is_admin() {
        return entries;
    }

    entries
        .into_iter()
        .filter(|entry| matches!(&entry.task, Some(task) if can_view_task(ctx, task)))
        .collect()
}

/// Checks that the actor may submit a completion for an instance
pub fn require_completion_allowed(
    ctx: &AuthContext,
    instance: &TaskInstance,
    task: &Task,
) -> Result<(), AuthzError> {
    if ctx.is_admin() {
        return Ok(());
    }

    require_task_visible(ctx, task)?;

    if instance.status.is_done() {
        return Err(AuthzError::AlreadyCompleted(instance.id));
    }

    Ok(())
}
