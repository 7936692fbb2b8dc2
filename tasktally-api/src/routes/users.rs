/// User management endpoints (admin only)
///
/// # Endpoints
///
/// - `GET /v1/users` - All users
/// - `POST /v1/users` - Create a user
/// - `PATCH /v1/users/:id` - Change a user's role and group
///
/// Password hashes are never serialized.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath},
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tasktally_shared::{
    auth::context::AuthContext,
    models::user::{User, UserRole},
    services::directory::{self, NewUser, UserAssignment},
};
use uuid::Uuid;

/// Create user request
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,

    pub email: String,

    pub password: String,

    /// Defaults to "user"
    #[serde(default)]
    pub role: UserRole,

    #[serde(default)]
    pub group_id: Option<Uuid>,
}

/// Reassignment request; both fields replace the stored values
#[derive(Debug, Deserialize)]
pub struct AssignUserRequest {
    pub role: UserRole,

    #[serde(default)]
    pub group_id: Option<Uuid>,
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(directory::list_users(&state.db, &auth).await?))
}

/// Creates a user
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an admin
/// - `404 Not Found`: Group does not exist
/// - `409 Conflict`: Email already exists
/// - `422 Unprocessable Entity`: Missing field or malformed email
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = directory::create_user(
        &state.db,
        &auth,
        NewUser {
            name: req.name,
            email: req.email,
            password: req.password,
            role: req.role,
            group_id: req.group_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Changes a user's role and group
///
/// Returns `409 Conflict` when it would demote the last admin.
pub async fn assign_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AssignUserRequest>,
) -> ApiResult<Json<User>> {
    let user = directory::assign_user(
        &state.db,
        &auth,
        user_id,
        UserAssignment {
            role: req.role,
            group_id: req.group_id,
        },
    )
    .await?;

    Ok(Json(user))
}
