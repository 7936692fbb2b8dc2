/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/login` - Login and get an access token
/// - `GET /v1/auth/me` - Current user

use crate::{app::AppState, error::ApiResult, extract::ApiJson};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use tasktally_shared::{
    auth::context::AuthContext,
    models::user::User,
    services::{accounts, directory},
};

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Access token
    pub access_token: String,

    /// Always "Bearer"
    pub token_type: &'static str,

    /// Token lifetime in seconds
    pub expires_in: i64,

    /// The authenticated user
    pub user: User,
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "admin@example.com",
///   "password": "admin123"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "access_token": "eyJ...",
///   "token_type": "Bearer",
///   "expires_in": 86400,
///   "user": { "id": "uuid", "name": "Admin", "email": "admin@example.com", "role": "admin", ... }
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials (same response for unknown
///   email and wrong password)
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = accounts::login(&state.db, &req.email, &req.password).await?;

    let ttl = state.config.token_ttl();
    let access_token = accounts::issue_token(&user, state.jwt_secret(), ttl)?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: ttl.num_seconds(),
        user,
    }))
}

/// Returns the authenticated user
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = directory::get_user(&state.db, &auth, auth.user_id).await?;

    Ok(Json(user))
}
