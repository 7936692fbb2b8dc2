/// Dashboard endpoint
///
/// `GET /v1/dashboard?date=` returns the points each user earned that day
/// together with the caller's view of the day's board.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ApiQuery,
    routes::{instances::BoardEntry, DateQuery},
};
use axum::{
    extract::State,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use tasktally_shared::{
    auth::context::AuthContext,
    models::task_instance::UserPoints,
    services::{accounting, tasks},
};

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub date: NaiveDate,

    /// Points per completing user, highest first
    pub points: Vec<UserPoints>,

    /// Sum of all awarded points for the day
    pub total_points: f64,

    pub instances: Vec<BoardEntry>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiQuery(query): ApiQuery<DateQuery>,
) -> ApiResult<Json<DashboardResponse>> {
    let date = query.resolve();

    let points = accounting::daily_points(&state.db, date).await?;
    let instances = tasks::instances_for_date(&state.db, &auth, date).await?;

    Ok(Json(DashboardResponse {
        date,
        total_points: points.iter().map(|p| p.points).sum(),
        points,
        instances: instances.into_iter().map(BoardEntry::from).collect(),
    }))
}
