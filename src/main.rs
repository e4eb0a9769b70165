use std::sync::Arc;

use anyhow::Context;

use trainvault_api::auth::rate_limit::spawn_rate_limit_cleanup;
use trainvault_api::config::Config;
use trainvault_api::services::snapshot::spawn_snapshot_scheduler;
use trainvault_api::store::{MemoryStore, PgStore, TrainingStore};
use trainvault_api::{build_router, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trainvault_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    let store: Arc<dyn TrainingStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url)
                .await
                .context("Failed to create database pool")?;
            db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store, config.clone());

    if config.snapshot_scheduler_enabled {
        spawn_snapshot_scheduler(
            state.store.clone(),
            config.reference_timezone,
            config.snapshot_check_interval_secs,
        );
        tracing::info!(
            timezone = %config.reference_timezone,
            "Monthly snapshot scheduler started"
        );
    }
    spawn_rate_limit_cleanup(state.rate_limiter.clone());

    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
