//! # TenantBoard API Server
//!
//! Serves the multi-tenant project and task API.
//!
//! ## Startup
//!
//! 1. Load and validate configuration (a bad config aborts startup)
//! 2. Initialize tracing
//! 3. Connect to PostgreSQL and apply migrations
//! 4. Serve until SIGINT/SIGTERM, then drain and close the pool
//!
//! If the database is unreachable at startup the server still comes up and
//! `/api/health` reports it as disconnected.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tenantboard-api
//! ```

use anyhow::Context;
use tenantboard_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat},
};
use tenantboard_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;

    init_tracing(config.log_format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = config.api.environment.as_str(),
        cors_dev_bypass = config.cors.dev_bypass,
        allowed_origins = config.cors.allowed_origins.len(),
        "TenantBoard API server starting"
    );

    let pool_config = config.database.pool_config();
    let db = match pool::create_pool(pool_config.clone()).await {
        Ok(db) => {
            if config.database.run_migrations {
                migrations::run_migrations(&db)
                    .await
                    .context("Failed to run database migrations")?;
            }

            let status = migrations::get_migration_status(&db)
                .await
                .context("Failed to read migration status")?;
            if status.is_up_to_date {
                tracing::info!(
                    applied = status.applied_migrations,
                    latest_version = ?status.latest_version,
                    "Database schema is up to date"
                );
            } else {
                tracing::warn!(
                    applied = status.applied_migrations,
                    embedded = migrations::embedded_migration_count(),
                    "Database schema is behind; set DATABASE_RUN_MIGRATIONS=true or migrate manually"
                );
            }
            db
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Database unavailable at startup; serving with a lazy pool"
            );
            pool::create_lazy_pool(&pool_config).context("Invalid DATABASE_URL")?
        }
    };

    let bind_address = config.bind_address();
    let state = AppState::new(db.clone(), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool::close_pool(db).await;
    tracing::info!("Server stopped");

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "tenantboard_api=debug,tenantboard_shared=info,tower_http=debug".into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
