//! Route Configuration Module
//!
//! - **`router`** - Main router creation, tracing and fallback
//! - **`api_routes`** - `/api` endpoints and their auth layers
//!
//! # Route Types
//!
//! ## Public
//!
//! - `POST /api/auth/signup` - User registration
//! - `POST /api/auth/login` - User login
//!
//! ## Authenticated (bearer token)
//!
//! - `/api/auth/me` - Current account
//! - `/api/projects` - Projects, developers and comments
//! - `/api/tickets` - Tickets, history and comments
//! - `/api/sprints` - Sprints and their tickets
//! - `/api/profiles` - Developer profiles and search
//!
//! ## Admin
//!
//! - `/api/users` - User list and role changes

/// Main router creation
pub mod router;

/// API endpoint routes
pub mod api_routes;

pub use router::create_router;
