//! Developer Profiles
//!
//! - **`db`** - Profile storage, joined with users for reads
//! - **`handlers`** - `/api/profiles` handlers, including search

pub mod db;
pub mod handlers;
