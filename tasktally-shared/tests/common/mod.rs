//! Shared helpers for the integration tests
//!
//! Each call to [`setup_pool`] returns a fresh, migrated in-memory database.
//! [`FileDatabase`] gives a migrated temporary file shared by several
//! connections, for tests that need real concurrent writers.

#![allow(dead_code)]

use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tasktally_shared::auth::context::AuthContext;
use tasktally_shared::db::{
    migrations::run_migrations,
    pool::{create_pool, DatabaseConfig},
};
use tasktally_shared::models::{
    group::Group,
    task::{CreateTask, Task},
    user::{CreateUser, User, UserRole},
};

/// Placeholder hash for accounts that never log in
pub const UNUSED_HASH: &str = "not-a-real-hash";

pub async fn setup_pool() -> SqlitePool {
    let pool = create_pool(DatabaseConfig::in_memory())
        .await
        .expect("Failed to create pool");
    run_migrations(&pool).await.expect("Failed to run migrations");
    pool
}

/// Migrated SQLite file with a multi-connection pool, removed on drop
pub struct FileDatabase {
    pub pool: SqlitePool,
    path: PathBuf,
}

impl FileDatabase {
    pub async fn new(max_connections: u32) -> Self {
        let path = std::env::temp_dir().join(format!("tasktally-test-{}.db", uuid::Uuid::new_v4()));
        let pool = create_pool(DatabaseConfig {
            url: format!("sqlite://{}", path.display()),
            max_connections,
            ..Default::default()
        })
        .await
        .expect("Failed to create file pool");
        run_migrations(&pool).await.expect("Failed to run migrations");

        Self { pool, path }
    }
}

impl Drop for FileDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date")
}

pub async fn insert_user(
    pool: &SqlitePool,
    email: &str,
    role: UserRole,
    group_id: Option<uuid::Uuid>,
) -> User {
    User::create(
        pool,
        CreateUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: UNUSED_HASH.to_string(),
            role,
            group_id,
        },
    )
    .await
    .expect("Failed to create user")
}

pub async fn insert_group(pool: &SqlitePool, name: &str) -> Group {
    Group::create(pool, name).await.expect("Failed to create group")
}

pub async fn insert_task(pool: &SqlitePool, title: &str, targeting: Targeting) -> Task {
    let (is_global, assigned_to, assigned_group_id) = match targeting {
        Targeting::Global => (true, None, None),
        Targeting::User(id) => (false, Some(id), None),
        Targeting::Group(id) => (false, None, Some(id)),
        Targeting::Nobody => (false, None, None),
    };

    Task::create(
        pool,
        CreateTask {
            title: title.to_string(),
            description: None,
            is_global,
            assigned_to,
            assigned_group_id,
            points_per_unit: 2.0,
            unit_name: Some("pages".to_string()),
            created_by: None,
        },
    )
    .await
    .expect("Failed to create task")
}

#[derive(Debug, Clone, Copy)]
pub enum Targeting {
    Global,
    User(uuid::Uuid),
    Group(uuid::Uuid),
    Nobody,
}

pub fn ctx(user: &User) -> AuthContext {
    AuthContext::from_user(user)
}
