//! # ProjectHub API Server
//!
//! Loads configuration, connects to PostgreSQL, applies migrations and
//! serves the REST API until Ctrl-C.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/projecthub \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p projecthub-api
//! ```

use anyhow::Context;
use projecthub_api::{
    app::{build_router, AppState},
    config::Config,
};
use projecthub_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "projecthub_api=debug,projecthub_shared=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("ProjectHub API Server v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().context("Failed to load configuration")?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to database")?;

    migrations::run_migrations(&db)
        .await
        .context("Failed to run migrations")?;

    let status = migrations::get_migration_status(&db).await?;
    tracing::info!(
        applied = status.applied_migrations,
        latest = ?status.latest_version,
        up_to_date = status.is_up_to_date,
        "Migration status"
    );

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(db.clone(), config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let stats = pool::get_pool_stats(&db);
    tracing::info!(
        active = stats.active_connections,
        idle = stats.idle_connections,
        "Shutting down, closing database pool"
    );
    pool::close_pool(db).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
