/// Task catalogue endpoints
///
/// # Endpoints
///
/// - `GET /v1/tasks` - Tasks visible to the caller
/// - `POST /v1/tasks` - Create a task (admin)
/// - `GET /v1/tasks/:id` - One task (404 when not visible)
/// - `DELETE /v1/tasks/:id` - Delete a task without instances (admin)

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
    models::task::Task,
    services::tasks::{self, NewTask},
};
use uuid::Uuid;

/// Create task request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub is_global: bool,

    #[serde(default)]
    pub assigned_to: Option<Uuid>,

    #[serde(default)]
    pub assigned_group_id: Option<Uuid>,

    /// Defaults to 1.0
    #[serde(default)]
    pub points_per_unit: Option<f64>,

    #[serde(default)]
    pub unit_name: Option<String>,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(req: CreateTaskRequest) -> Self {
        NewTask {
            title: req.title,
            description: req.description,
            is_global: req.is_global,
            assigned_to: req.assigned_to,
            assigned_group_id: req.assigned_group_id,
            points_per_unit: req.points_per_unit,
            unit_name: req.unit_name,
        }
    }
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(tasks::list_tasks(&state.db, &auth).await?))
}

/// Creates a task
///
/// # Endpoint
///
/// ```text
/// POST /v1/tasks
/// Content-Type: application/json
///
/// {
///   "title": "Reading",
///   "is_global": true,
///   "points_per_unit": 2.0,
///   "unit_name": "pages"
/// }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an admin
/// - `404 Not Found`: Assigned user or group does not exist
/// - `422 Unprocessable Entity`: Empty title or non-positive rate
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = tasks::create_task(&state.db, &auth, req.into()).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(task_id): ApiPath<Uuid>,
) -> ApiResult<Json<Task>> {
    Ok(Json(tasks::get_task(&state.db, &auth, task_id).await?))
}

/// Deletes a task
///
/// Returns `409 Conflict` while the task has instances.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(task_id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    tasks::delete_task(&state.db, &auth, task_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
