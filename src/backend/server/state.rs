/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` is the only state shared between requests:
 * - The SQLite connection pool
 * - The JWT signing keys
 * - The loaded configuration
 *
 * All of it is immutable after startup; the pool does its own
 * synchronization, so no locks are needed.
 *
 * # Example
 *
 * ```rust
 * use devtracker::backend::server::state::AppState;
 * use axum::extract::State;
 * use sqlx::SqlitePool;
 *
 * async fn handler(State(pool): State<SqlitePool>) {
 *     // Query with the pool
 * }
 * ```
 */

use axum::extract::FromRef;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::backend::auth::sessions::SessionKeys;
use crate::shared::AppConfig;

/// Application state shared by all handlers
///
/// # Fields
///
/// * `db` - Database connection pool
/// * `sessions` - JWT signing and verification keys
/// * `config` - Configuration the app was created with
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: SqlitePool,
    pub sessions: Arc<SessionKeys>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        let sessions = SessionKeys::new(&config.auth.jwt_secret, config.auth.token_ttl_hours);
        Self {
            db,
            sessions: Arc::new(sessions),
            config: Arc::new(config),
        }
    }

    /// bcrypt cost for new password hashes
    pub fn bcrypt_cost(&self) -> u32 {
        self.config.auth.bcrypt_cost
    }
}

/// Implement FromRef for SqlitePool
///
/// This allows Axum handlers to extract the pool directly from `AppState`
/// using `State(SqlitePool)`.
impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db.clone()
    }
}

/// Implement FromRef for the session keys
impl FromRef<AppState> for Arc<SessionKeys> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
