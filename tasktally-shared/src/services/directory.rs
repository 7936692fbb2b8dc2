/// Groups and user accounts.
///
/// Everything that changes the directory is admin-only and is checked before
/// any row is read.

use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{authorization, context::AuthContext, password};
use crate::error::{is_unique_violation, CoreError, CoreResult};
use crate::models::{
    group::Group,
    user::{normalize_email, CreateUser, User, UserRole},
};

/// Input for creating a user account
#[derive(Debug, Clone, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    pub role: UserRole,

    pub group_id: Option<Uuid>,
}

/// New role and group for an existing user
#[derive(Debug, Clone, Copy)]
pub struct UserAssignment {
    pub role: UserRole,
    pub group_id: Option<Uuid>,
}

/// Creates a group
///
/// # Errors
///
/// - `Permission` for non-admins
/// - `Validation` for an empty name
/// - `Conflict` when the name is taken
pub async fn create_group(pool: &SqlitePool, ctx: &AuthContext, name: &str) -> CoreResult<Group> {
    authorization::require_admin(ctx, "create groups")?;

    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::invalid("name", "Name is required"));
    }

    if Group::find_by_name(pool, name).await?.is_some() {
        return Err(CoreError::Conflict(format!("Group '{}' already exists", name)));
    }

    let group = Group::create(pool, name).await.map_err(|err| {
        if is_unique_violation(&err) {
            CoreError::Conflict(format!("Group '{}' already exists", name))
        } else {
            err.into()
        }
    })?;

    info!(group_id = %group.id, admin_id = %ctx.user_id, "Group created");
    Ok(group)
}

/// Lists all groups
pub async fn list_groups(pool: &SqlitePool) -> CoreResult<Vec<Group>> {
    Ok(Group::list(pool).await?)
}

/// Creates a user account on behalf of an admin
///
/// # Errors
///
/// - `Permission` for non-admins
/// - `Validation` for missing name/email/password or a malformed email
/// - `Conflict` when the email is taken (case-insensitive)
/// - `NotFound` when `group_id` does not exist
pub async fn create_user(pool: &SqlitePool, ctx: &AuthContext, data: NewUser) -> CoreResult<User> {
    authorization::require_admin(ctx, "create users")?;

    let user = insert_user(pool, data).await?;

    info!(
        user_id = %user.id,
        admin_id = %ctx.user_id,
        role = user.role.as_str(),
        "User created"
    );
    Ok(user)
}

/// Validates, hashes and stores a new account without an actor check
async fn insert_user(pool: &SqlitePool, data: NewUser) -> CoreResult<User> {
    let data = NewUser {
        name: data.name.trim().to_string(),
        email: normalize_email(&data.email),
        ..data
    };
    data.validate()?;

    if User::find_by_email(pool, &data.email).await?.is_some() {
        warn!("Rejected user creation for an existing email");
        return Err(CoreError::Conflict("Email already exists".to_string()));
    }

    if let Some(group_id) = data.group_id {
        Group::find_by_id(pool, group_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Group", group_id))?;
    }

    let password_hash = password::hash_password(&data.password)?;

    User::create(
        pool,
        CreateUser {
            name: data.name,
            email: data.email,
            password_hash,
            role: data.role,
            group_id: data.group_id,
        },
    )
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            CoreError::Conflict("Email already exists".to_string())
        } else {
            err.into()
        }
    })
}

/// Lists all users
pub async fn list_users(pool: &SqlitePool, ctx: &AuthContext) -> CoreResult<Vec<User>> {
    authorization::require_admin(ctx, "list users")?;

    Ok(User::list(pool).await?)
}

/// Looks up a single user
///
/// Users may read their own record; admins may read any.
pub async fn get_user(pool: &SqlitePool, ctx: &AuthContext, user_id: Uuid) -> CoreResult<User> {
    if user_id != ctx.user_id {
        authorization::require_admin(ctx, "view other users")?;
    }

    User::find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", user_id))
}

/// Changes a user's role and group
///
/// # Errors
///
/// - `Permission` for non-admins
/// - `NotFound` for an unknown user or group
/// - `Conflict` when this would leave no admin
pub async fn assign_user(
    pool: &SqlitePool,
    ctx: &AuthContext,
    user_id: Uuid,
    assignment: UserAssignment,
) -> CoreResult<User> {
    authorization::require_admin(ctx, "reassign users")?;

    let mut tx = pool.begin().await?;

    let current = User::find_by_id(&mut *tx, user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", user_id))?;

    if let Some(group_id) = assignment.group_id {
        Group::find_by_id(&mut *tx, group_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Group", group_id))?;
    }

    if current.role.is_admin()
        && !assignment.role.is_admin()
        && User::count_admins(&mut *tx).await? <= 1
    {
        return Err(CoreError::Conflict(
            "Cannot demote the last remaining admin".to_string(),
        ));
    }

    let updated = User::update_assignment(&mut *tx, user_id, assignment.role, assignment.group_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", user_id))?;

    tx.commit().await?;

    info!(
        user_id = %user_id,
        admin_id = %ctx.user_id,
        role = updated.role.as_str(),
        group_id = ?updated.group_id,
        "User reassigned"
    );

    Ok(updated)
}
