//! Common test utilities for the API integration tests
//!
//! Each [`TestContext`] owns a fresh in-memory database with the bootstrap
//! admin and one regular user, plus a router wired to it.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tasktally_api::{
    app::{build_router, AppState},
    config::Config,
};
use tasktally_shared::{
    auth::password,
    db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    },
    models::user::{CreateUser, User, UserRole},
    services::accounts::{bootstrap_admin, issue_token},
};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const USER_PASSWORD: &str = "reader-password";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: sqlx::SqlitePool,
    pub app: Router,
    pub config: Config,
    pub admin: User,
    pub user: User,
    pub admin_token: String,
    pub user_token: String,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("sqlite::memory:".to_string()),
            "JWT_SECRET" => Some(TEST_SECRET.to_string()),
            _ => None,
        })?;

        let db = create_pool(DatabaseConfig::in_memory()).await?;
        run_migrations(&db).await?;

        let admin = bootstrap_admin(&db, &config.admin.seed())
            .await?
            .ok_or_else(|| anyhow::anyhow!("bootstrap admin not created"))?;

        let user = User::create(
            &db,
            CreateUser {
                name: "Reader".to_string(),
                email: "reader@example.com".to_string(),
                password_hash: password::hash_password(USER_PASSWORD)?,
                role: UserRole::User,
                group_id: None,
            },
        )
        .await?;

        let admin_token = issue_token(&admin, TEST_SECRET, config.token_ttl())?;
        let user_token = issue_token(&user, TEST_SECRET, config.token_ttl())?;

        let app = build_router(AppState::new(db.clone(), config.clone()));

        Ok(Self {
            db,
            app,
            config,
            admin,
            user,
            admin_token,
            user_token,
        })
    }

    /// Sends a request and returns the status with the parsed JSON body
    ///
    /// Empty bodies come back as `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.dispatch(request).await
    }

    /// Posts a JSON-typed body verbatim, including bodies that do not parse
    pub async fn post_raw(&self, uri: &str, token: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }
}
