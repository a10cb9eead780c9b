use std::sync::Arc;

use anyhow::Context;

use checkin_api::clock::SystemClock;
use checkin_api::config::{Config, StoreBackend};
use checkin_api::db::{self, CheckinRepository, MemoryCheckinRepository, PgCheckinRepository};
use checkin_api::services::{CheckinService, DailyUniquenessGuard};
use checkin_api::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checkin_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env().context("invalid configuration")?);

    let repo: Arc<dyn CheckinRepository> = match config.store {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            let pool = db::create_pool(url, config.db_max_connections)
                .await
                .context("failed to create database pool")?;

            let repo = PgCheckinRepository::new(pool);
            repo.migrate()
                .await
                .context("failed to run database migrations")?;
            tracing::info!("Database migrations applied");
            Arc::new(repo)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory check-in store; data is lost on restart");
            Arc::new(MemoryCheckinRepository::new())
        }
    };

    let checkins = CheckinService::new(
        repo,
        Arc::new(config.journal_key.clone()),
        DailyUniquenessGuard::new(config.day_offset),
    );

    let state = AppState {
        config: config.clone(),
        checkins,
        clock: Arc::new(SystemClock),
    };

    let app = checkin_api::app(state);

    let addr = config.listen_addr();
    tracing::info!(
        day_offset_secs = config.day_offset.local_minus_utc(),
        "Starting server on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
