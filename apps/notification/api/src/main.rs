use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres;
use migration::Migrator;
use std::time::Duration;
use tracing::info;

mod api;
mod cleanup;
mod config;
mod notifier;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Colored error reports before anything fallible
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);
    info!(storage = %config.storage, locale = %config.default_locale, "Configuration loaded");

    let db = match config.database.clone() {
        Some(database) => {
            let db = postgres::connect_from_config_with_retry(database, None)
                .await
                .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

            postgres::run_migrations::<Migrator>(&db, config.app.name)
                .await
                .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;
            Some(db)
        }
        None => {
            info!("Using in-memory storage; data is lost on restart");
            None
        }
    };

    let state = AppState { config, db };

    let api::Routes {
        router: api_routes,
        token_cleanup,
    } = api::routes(&state);

    // create_router adds docs/middleware to our composed routes
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes, &state.config.server)?;

    // - /health: liveness check with app name/version
    // - /ready: readiness check against the database
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::ready_router(state.clone()));

    info!("Starting notification API with graceful shutdown (30s timeout)");

    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            token_cleanup.abort();
            info!("Token cleanup stopped");

            if let Some(db) = state.db {
                match db.close().await {
                    Ok(()) => info!("PostgreSQL connection closed successfully"),
                    Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
                }
            }
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Notification API shutdown complete");
    Ok(())
}
