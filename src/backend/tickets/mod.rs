//! Tickets
//!
//! - **`db`** - Ticket storage; deletion also detaches the ticket from sprints
//! - **`handlers`** - `/api/tickets` handlers, including change history

pub mod db;
pub mod handlers;
