//! Backend Module
//!
//! All server-side code: the Axum HTTP server, authentication, and the
//! per-resource handlers that read and write documents.
//!
//! # Architecture
//!
//! - **`server`** - Configuration loading, application state, app creation
//! - **`routes`** - Router assembly
//! - **`auth`** - Users, JWT sessions, signup/login handlers, admin routes
//! - **`middleware`** - Bearer-token authentication and role gates
//! - **`projects`** / **`sprints`** / **`tickets`** / **`profiles`** -
//!   Resource handlers (`handlers.rs`) and document storage (`db.rs`)
//! - **`store`** - Row decoding helpers shared by the `db` modules
//! - **`validation`** - Request field validation
//! - **`error`** - `BackendError` and its HTTP conversion
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Config, state and initialization
//! ├── routes/         - Route configuration
//! ├── auth/           - Authentication and users
//! ├── middleware/     - Request middleware
//! ├── projects/       - Projects, developers, project comments
//! ├── sprints/        - Sprints and their tickets
//! ├── tickets/        - Tickets, history and comments
//! ├── profiles/       - Developer profiles
//! ├── store.rs        - Document decoding helpers
//! ├── validation.rs   - Field validation
//! └── error/          - Error types
//! ```
//!
//! # Request Flow
//!
//! request → `auth_middleware` (bearer token) → handler validates input →
//! handler checks the caller's role against the document → store read/write
//! → JSON response. Every failure is a `BackendError`, which renders itself
//! as a JSON response with the right status code.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Backend error types
pub mod error;

/// Projects
pub mod projects;

/// Sprints
pub mod sprints;

/// Tickets
pub mod tickets;

/// Developer profiles
pub mod profiles;

/// Document decoding helpers
pub mod store;

/// Request field validation
pub mod validation;

/// Re-export commonly used types
pub use server::create_app;
pub use error::BackendError;
