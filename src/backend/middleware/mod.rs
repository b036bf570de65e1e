//! Middleware Module
//!
//! HTTP middleware that runs before handlers.
//!
//! # Architecture
//!
//! - **`auth`** - Bearer-token authentication, the admin role gate, and the
//!   `AuthUser` extractor handlers use to read the caller
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{middleware, routing::get, Router};
//! use devtracker::backend::middleware::{auth_middleware, require_admin};
//! use devtracker::backend::server::state::AppState;
//!
//! fn admin_routes(state: AppState) -> Router<AppState> {
//!     Router::new()
//!         .route("/api/users", get(|| async { "ok" }))
//!         .route_layer(middleware::from_fn(require_admin))
//!         .route_layer(middleware::from_fn_with_state(state, auth_middleware))
//! }
//! ```

pub mod auth;

pub use auth::{auth_middleware, require_admin, AuthUser, AuthenticatedUser};
