//! Equitask HTTP server entry point.
//!
//! Reads configuration from the environment, connects the stores, and
//! serves the API until SIGINT or SIGTERM.

use std::sync::Arc;

use axum::Router;
use diesel::PgConnection;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use equitask::api::{self, AppState, RouterOptions};
use equitask::config::AppConfig;
use equitask::task::adapters::{files::LocalProofFileStore, postgres::TaskPgPool};
use eyre::WrapErr;
use mockable::DefaultClock;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "equitask=info,tower_http=info";

/// Schema statements, applied in order at startup. Each is idempotent.
const SCHEMA_MIGRATIONS: [&str; 2] = [
    include_str!("../migrations/2026-10-18-000000_create_tasks/up.sql"),
    include_str!("../migrations/2026-10-18-000001_create_notifications/up.sql"),
];

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().wrap_err("invalid configuration")?;
    info!(?config, "configuration loaded");

    let app = build_app(&config).await?;
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .wrap_err_with(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server terminated with an error")?;
    info!("shutdown complete");
    Ok(())
}

async fn build_app(config: &AppConfig) -> eyre::Result<Router> {
    let files = LocalProofFileStore::open(&config.upload_dir, Arc::new(DefaultClock))
        .wrap_err_with(|| format!("failed to open upload directory {}", config.upload_dir))?;
    let options = RouterOptions::from_config(config);

    let Some(url) = config.database_url.clone() else {
        warn!("DATABASE_URL is not set; tasks and notifications are kept in memory and lost on exit");
        return Ok(api::router(
            AppState::in_memory(files, &config.jwt_secret),
            &options,
        ));
    };
    let pool = connect(url, config.pool_size).await?;
    info!(pool_size = config.pool_size, "connected to PostgreSQL");
    Ok(api::router(
        AppState::postgres(pool, files, &config.jwt_secret),
        &options,
    ))
}

async fn connect(url: String, pool_size: u32) -> eyre::Result<TaskPgPool> {
    tokio::task::spawn_blocking(move || -> eyre::Result<TaskPgPool> {
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(ConnectionManager::<PgConnection>::new(url))
            .wrap_err("failed to build database pool")?;
        let mut conn = pool
            .get()
            .wrap_err("failed to check out a database connection")?;
        for statement in SCHEMA_MIGRATIONS {
            conn.batch_execute(statement)
                .wrap_err("failed to apply database schema")?;
        }
        Ok(pool)
    })
    .await
    .wrap_err("database setup task failed")?
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("shutdown signal received");
}
