//! DevTracker - Main Library
//!
//! DevTracker is a project and ticket tracker for small development teams.
//! Managers create projects, plan sprints and hand out tickets; developers
//! keep a profile, work tickets and leave comments along the way.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared by the server and any API client
//!   - Document models (projects, sprints, tickets, profiles, comments)
//!   - Application configuration
//!   - Error types
//!
//! - **`backend`** - The Axum HTTP server
//!   - Authentication, JWT sessions and role checks
//!   - Per-resource route handlers and document storage (SQLite via sqlx)
//!   - Router assembly and server bootstrap
//!
//! # Usage
//!
//! ```rust,no_run
//! use devtracker::backend::server::create_app;
//! use devtracker::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let app = create_app(config).await?;
//! // Serve `app` with axum::serve
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::SharedError` for validation and parsing failures
//! - `shared::config::ConfigError` for configuration loading
//! - `backend::BackendError` for everything that ends up as an HTTP response

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
