//! # Taskgate API Server
//!
//! HTTP service issuing signed bearer credentials at login and gating the
//! user and task resources behind them.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) STORAGE_BACKEND=memory cargo run -p taskgate-api
//! ```

use std::sync::Arc;

use anyhow::Context;
use taskgate_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat, StorageConfig},
    seed::seed_demo_user,
};
use taskgate_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool},
    },
    store::{MemoryStore, PgStore, Storage},
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    tracing::info!(
        "Taskgate API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let (store, pool) = match &config.storage {
        StorageConfig::Postgres(db_config) => {
            let pool = create_pool(db_config.clone())
                .await
                .context("Failed to connect to database")?;
            run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            let store: Arc<dyn Storage> = Arc::new(PgStore::new(pool.clone()));
            (store, Some(pool))
        }
        StorageConfig::Memory => {
            tracing::warn!("Using in-memory storage; data will be lost on restart");
            let store: Arc<dyn Storage> = Arc::new(MemoryStore::new());
            (store, None)
        }
    };

    let bind_address = config.bind_address();
    let seed = config.seed.clone();
    let state = AppState::new(Arc::clone(&store), config)?;

    if let (true, Some(password)) = (seed.enabled, seed.password.as_deref()) {
        seed_demo_user(store.as_ref(), &state.hasher, &seed.email, password)
            .await
            .context("Failed to seed demo user")?;
    }

    let app = build_router(state);

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        close_pool(&pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskgate_api=debug,taskgate_shared=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
