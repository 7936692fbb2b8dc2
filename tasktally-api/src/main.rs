//! # TaskTally API Server
//!
//! Serves the TaskTally JSON API: daily task instances, completions, points
//! and user/group/task administration.
//!
//! On startup the server:
//! 1. Loads configuration from the environment (and `.env`)
//! 2. Opens the SQLite pool and applies embedded migrations
//! 3. Creates the bootstrap admin if no admin exists
//! 4. Serves until Ctrl-C
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tasktally-api
//! ```

use tasktally_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat},
};
use tasktally_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    services::accounts::bootstrap_admin,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let json_logs = config.log.format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tasktally_api=debug,tasktally_shared=info,tower_http=debug".into()
            }),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!(
        "TaskTally API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    if config.jwt.generated {
        tracing::warn!(
            "JWT_SECRET is not set; using a random secret, tokens will not survive a restart"
        );
    }

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    match bootstrap_admin(&pool, &config.admin.seed()).await? {
        Some(admin) => tracing::info!(email = %admin.email, "Created bootstrap admin account"),
        None => tracing::debug!("Admin account already present"),
    }

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
