/// Daily instance endpoints
///
/// # Endpoints
///
/// - `GET /v1/instances?date=` - The day's instances visible to the caller
/// - `POST /v1/instances/:id/complete` - Submit a completion
/// - `POST /v1/instances/instantiate` - Create every task's instance for a day (admin)
/// - `POST /v1/tasks/:id/instances` - Create one task's instance for a day

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{ApiJson, ApiPath, ApiQuery, JsonOrDefault},
    routes::DateQuery,
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tasktally_shared::{
    auth::{
        authorization::{self, DailyEntry},
        context::AuthContext,
    },
    error::CoreError,
    models::{task::Task, task_instance::TaskInstance},
    services::{
        accounting,
        instantiation::{self, DaySummary, EnsureOutcome},
        tasks,
    },
};
use uuid::Uuid;

/// One row of the daily board
#[derive(Debug, Serialize)]
pub struct BoardEntry {
    /// Task title, or a placeholder when the task no longer resolves
    pub title: String,

    pub instance: TaskInstance,

    pub task: Option<Task>,
}

impl From<DailyEntry> for BoardEntry {
    fn from(entry: DailyEntry) -> Self {
        Self {
            title: entry.title(),
            instance: entry.instance,
            task: entry.task,
        }
    }
}

/// Completion request
#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    /// Amount done, in the task's unit
    pub completed_value: f64,
}

/// Request to create a task's instance for a day
#[derive(Debug, Default, Deserialize)]
pub struct EnsureInstanceRequest {
    /// Defaults to today
    pub date: Option<NaiveDate>,

    /// Defaults to 0
    pub target_value: Option<f64>,
}

/// Request to instantiate a whole day
#[derive(Debug, Default, Deserialize)]
pub struct InstantiateRequest {
    /// Defaults to today
    pub date: Option<NaiveDate>,
}

/// Whole-day instantiation result
#[derive(Debug, Serialize)]
pub struct InstantiateResponse {
    pub date: NaiveDate,

    #[serde(flatten)]
    pub summary: DaySummary,
}

/// Lists the day's instances visible to the caller
pub async fn list_instances(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiQuery(query): ApiQuery<DateQuery>,
) -> ApiResult<Json<Vec<BoardEntry>>> {
    let entries = tasks::instances_for_date(&state.db, &auth, query.resolve()).await?;

    Ok(Json(entries.into_iter().map(BoardEntry::from).collect()))
}

/// Submits a completion for an instance
///
/// # Endpoint
///
/// ```text
/// POST /v1/instances/:id/complete
/// Content-Type: application/json
///
/// { "completed_value": 5 }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Task not visible, or already completed by someone
/// - `404 Not Found`: Unknown instance
/// - `422 Unprocessable Entity`: Negative value
pub async fn complete_instance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(instance_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<CompleteRequest>,
) -> ApiResult<Json<TaskInstance>> {
    let instance =
        accounting::complete_instance(&state.db, &auth, instance_id, req.completed_value).await?;

    Ok(Json(instance))
}

/// Creates the instance of every task for a day (admin only)
///
/// An empty body means today; a body that does not parse is rejected.
pub async fn instantiate_day(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    JsonOrDefault(req): JsonOrDefault<InstantiateRequest>,
) -> ApiResult<Json<InstantiateResponse>> {
    authorization::require_admin(&auth, "instantiate a day").map_err(CoreError::from)?;

    let date = req.date.unwrap_or_else(super::today);
    let summary = instantiation::instantiate_day(&state.db, date).await?;

    Ok(Json(InstantiateResponse { date, summary }))
}

/// Creates one task's instance for a day
///
/// # Endpoint
///
/// ```text
/// POST /v1/tasks/:id/instances
/// Content-Type: application/json
///
/// { "date": "2024-01-01", "target_value": 10 }
/// ```
///
/// An empty body means today with target 0.
///
/// # Responses
///
/// - `201 Created`: The new instance
/// - `400 Bad Request` / `422 Unprocessable Entity`: Malformed body; nothing written
/// - `409 Conflict`: An instance already exists for that day; nothing written
pub async fn ensure_instance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(task_id): ApiPath<Uuid>,
    JsonOrDefault(req): JsonOrDefault<EnsureInstanceRequest>,
) -> ApiResult<(StatusCode, Json<TaskInstance>)> {
    let date = req.date.unwrap_or_else(super::today);

    match instantiation::ensure_instance(&state.db, &auth, task_id, date, req.target_value).await? {
        EnsureOutcome::Created(instance) => Ok((StatusCode::CREATED, Json(instance))),
        EnsureOutcome::AlreadyExists(existing) => Err(ApiError::Conflict(format!(
            "Instance {} already exists for task {} on {}",
            existing.id, task_id, date
        ))),
    }
}
