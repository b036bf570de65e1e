//! Projects
//!
//! - **`db`** - Project storage, membership queries, cascade delete
//! - **`handlers`** - `/api/projects` handlers

pub mod db;
pub mod handlers;

pub use handlers::find_project;
