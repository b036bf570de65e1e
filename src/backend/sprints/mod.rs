//! Sprints
//!
//! - **`db`** - Sprint storage
//! - **`handlers`** - `/api/sprints` handlers, ticket attachment

pub mod db;
pub mod handlers;
