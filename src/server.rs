//! HTTP server initialization and runtime setup.
//!
//! Builds the storage backend, the admission controller and the Axum server.

use crate::application::services::{AdmissionController, LinkService};
use crate::config::Config;
use crate::domain::repositories::SlugRepository;
use crate::infrastructure::persistence::{InMemorySlugRepository, PgSlugRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Slug storage (PostgreSQL with migrations, or in-memory)
/// - The process-wide admission controller
/// - Axum HTTP server with peer addresses available to the admission guard
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository = build_repository(&config).await?;

    let admission = Arc::new(AdmissionController::new(config.rate_limits.clone()));
    let link_service = Arc::new(LinkService::new(
        repository,
        config.max_slug_probes,
        config.base_url.clone(),
    ));

    let state = AppState::new(admission, link_service);
    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn build_repository(config: &Config) -> Result<Arc<dyn SlugRepository>> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set, links are kept in memory only");
        return Ok(Arc::new(InMemorySlugRepository::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    Ok(Arc::new(PgSlugRepository::new(Arc::new(pool))))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
