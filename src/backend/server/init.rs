/**
 * Server Initialization
 *
 * This module builds the Axum application from an `AppConfig`.
 *
 * # Initialization Process
 *
 * 1. Open the database and apply migrations
 * 2. Create the shared state (pool, session keys, config)
 * 3. Seed the bootstrap admin, if one is configured
 * 4. Create and configure the router
 *
 * Any failure here is fatal; the binary reports it and exits.
 */

use axum::Router;

use crate::backend::error::BackendError;
use crate::backend::routes::create_router;
use crate::backend::server::config::load_database;
use crate::backend::server::seed::seed_admin;
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

/// Create and configure the Axum application
///
/// # Example
///
/// ```rust,no_run
/// use devtracker::backend::server::create_app;
/// use devtracker::shared::AppConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let app = create_app(AppConfig::load()?).await?;
/// # Ok(())
/// # }
/// ```
pub async fn create_app(config: AppConfig) -> Result<Router, BackendError> {
    tracing::info!("Initializing DevTracker backend server");

    // Step 1: Database
    let db = load_database(&config.database).await?;

    // Step 2: Shared state
    if config.uses_default_secret() {
        tracing::warn!("Using the built-in JWT secret; set JWT_SECRET outside development");
    }
    let app_state = AppState::new(db, config);

    // Step 3: Bootstrap admin
    if let Some(seed) = &app_state.config.admin {
        seed_admin(&app_state.db, seed, app_state.bcrypt_cost()).await?;
    }

    // Step 4: Router
    let app = create_router(app_state);
    tracing::info!("Router configured");

    Ok(app)
}
