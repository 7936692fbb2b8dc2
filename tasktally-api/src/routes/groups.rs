/// Group endpoints
///
/// - `GET /v1/groups` - All groups
/// - `POST /v1/groups` - Create a group (admin)

use crate::{app::AppState, error::ApiResult, extract::ApiJson};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use tasktally_shared::{
    auth::context::AuthContext, models::group::Group, services::directory,
};
use validator::Validate;

/// Create group request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,
}

pub async fn list_groups(State(state): State<AppState>) -> ApiResult<Json<Vec<Group>>> {
    Ok(Json(directory::list_groups(&state.db).await?))
}

pub async fn create_group(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<CreateGroupRequest>,
) -> ApiResult<(StatusCode, Json<Group>)> {
    req.validate()?;

    let group = directory::create_group(&state.db, &auth, &req.name).await?;

    Ok((StatusCode::CREATED, Json(group)))
}
