//! Server Module
//!
//! Everything needed to turn an `AppConfig` into a running Axum router.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Database pool and migrations
//! ├── seed.rs         - Bootstrap admin account
//! └── init.rs         - App creation
//! ```
//!
//! # State Management
//!
//! `AppState` holds the connection pool, the JWT keys and the configuration.
//! None of it changes after startup, so handlers share it without locks.

/// Application state management
pub mod state;

/// Database setup
pub mod config;

/// Bootstrap admin seeding
pub mod seed;

/// Server initialization
pub mod init;

pub use init::create_app;
pub use state::AppState;
