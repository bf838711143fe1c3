use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod models;
mod repositories;
mod routes;
mod service;
mod state;
mod validation;

use common::database::{DatabaseConfig, init_pool};

use crate::{
    config::{AppConfig, StorageBackend},
    repositories::{MemoryStore, PgExerciseRepository, PgUserRepository, postgres::init_schema},
    service::TrackerService,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting exercise tracker service");

    let app_config = AppConfig::from_env()?;

    let service = match app_config.storage_backend {
        StorageBackend::Postgres => {
            // Initialize database connection pool
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            // Check database connectivity
            if common::database::health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            init_schema(&pool).await?;

            TrackerService::new(
                Arc::new(PgUserRepository::new(pool.clone())),
                Arc::new(PgExerciseRepository::new(pool)),
            )
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on shutdown");
            let store = Arc::new(MemoryStore::new());
            TrackerService::new(store.clone(), store)
        }
    };

    let app_state = AppState {
        service,
        views_dir: app_config.views_dir,
        public_dir: app_config.public_dir,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let address = format!("0.0.0.0:{}", app_config.app_port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Exercise tracker listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
