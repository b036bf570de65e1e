/**
 * Database Setup
 *
 * This module opens the SQLite connection pool described by the
 * `[database]` config section and applies the migrations in `migrations/`.
 *
 * # In-memory databases
 *
 * Every connection to `sqlite::memory:` opens its own empty database, so an
 * in-memory URL gets a pool of exactly one connection that is never
 * recycled. Tests rely on this to run the full app without touching disk.
 *
 * # File databases
 *
 * File databases run in WAL mode with a busy timeout, so concurrent writers
 * from the pool queue on the write lock instead of failing.
 *
 * # Error Handling
 *
 * Unlike optional services, the store is required: a bad URL, a failed
 * connection or a failed migration stops startup.
 */

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

use crate::backend::error::BackendError;
use crate::shared::config::DatabaseConfig;

/// True for `sqlite::memory:` and `mode=memory` URLs
pub fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Open the connection pool and run migrations
///
/// # Example
///
/// ```rust,no_run
/// use devtracker::backend::server::config::load_database;
/// use devtracker::shared::AppConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AppConfig::load()?;
/// let pool = load_database(&config.database).await?;
/// # Ok(())
/// # }
/// ```
pub async fn load_database(config: &DatabaseConfig) -> Result<SqlitePool, BackendError> {
    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

    let (options, pool_options) = if is_in_memory(&config.url) {
        tracing::info!("Opening in-memory database");
        let pool_options = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
        (options, pool_options)
    } else {
        tracing::info!("Connecting to database...");
        let options = options
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10));
        (options, SqlitePoolOptions::new().max_connections(config.max_connections))
    };

    let pool = pool_options.connect_with(options).await.map_err(|e| {
        tracing::error!("Failed to create database connection pool: {:?}", e);
        e
    })?;
    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run database migrations: {}", e);
        e
    })?;
    tracing::info!("Database migrations completed successfully");

    Ok(pool)
}

/// Fresh migrated in-memory pool for unit tests
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    };
    load_database(&config).await.expect("in-memory database")
}
