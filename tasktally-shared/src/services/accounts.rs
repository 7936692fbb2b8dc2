/// Login, access tokens and the bootstrap admin
///
/// Login failures are deliberately uniform: an unknown email and a wrong
/// password both yield `CoreError::InvalidCredentials`, and both pay for one
/// Argon2 verification.

use chrono::Duration;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::{
    jwt::{self, Claims, JwtError},
    password,
};
use crate::error::{CoreError, CoreResult};
use crate::models::user::{normalize_email, CreateUser, User, UserRole};

/// Credentials for the admin account created on first start
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Default for AdminSeed {
    fn default() -> Self {
        Self {
            name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            password: "admin123".to_string(),
        }
    }
}

/// Checks an email/password pair
///
/// # Errors
///
/// - `InvalidCredentials` for an unknown email or a wrong password
/// - `Password` when the stored hash is unreadable
pub async fn login(pool: &SqlitePool, email: &str, password: &str) -> CoreResult<User> {
    let email = normalize_email(email);

    let Some(user) = User::find_by_email(pool, &email).await? else {
        password::verify_against_dummy(password)?;
        warn!("Login failed: unknown email");
        return Err(CoreError::InvalidCredentials);
    };

    if !password::verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(CoreError::InvalidCredentials);
    }

    info!(user_id = %user.id, role = user.role.as_str(), "User logged in");
    Ok(user)
}

/// Issues an access token for `user` valid for `ttl`
pub fn issue_token(user: &User, secret: &str, ttl: Duration) -> Result<String, JwtError> {
    jwt::create_token(&Claims::new(user.id, ttl), secret)
}

/// Creates the admin account when none exists yet
///
/// Does nothing if any admin exists or if a user already holds the seed
/// email. Returns the created admin, if any.
pub async fn bootstrap_admin(pool: &SqlitePool, seed: &AdminSeed) -> CoreResult<Option<User>> {
    let email = normalize_email(&seed.email);
    if email.is_empty() || seed.password.is_empty() {
        return Err(CoreError::invalid(
            "admin",
            "Bootstrap admin email and password are required",
        ));
    }

    let mut tx = pool.begin().await?;

    if User::count_admins(&mut *tx).await? > 0 {
        return Ok(None);
    }

    if User::find_by_email(&mut *tx, &email).await?.is_some() {
        warn!("No admin exists but the bootstrap email is taken; skipping bootstrap");
        return Ok(None);
    }

    let password_hash = password::hash_password(&seed.password)?;
    let admin = User::create(
        &mut *tx,
        CreateUser {
            name: seed.name.trim().to_string(),
            email,
            password_hash,
            role: UserRole::Admin,
            group_id: None,
        },
    )
    .await?;

    tx.commit().await?;

    info!(user_id = %admin.id, email = %admin.email, "Bootstrap admin created");
    Ok(Some(admin))
}
