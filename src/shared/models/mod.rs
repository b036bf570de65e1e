//! Document models
//!
//! Each tracked resource is a document: scalar fields plus embedded lists
//! (comments, change history, developer lists) and references to other
//! documents by id. All models serialize with camelCase field names.

pub mod user;
pub mod comment;
pub mod project;
pub mod sprint;
pub mod ticket;
pub mod profile;

pub use user::{Role, UserSummary};
pub use comment::Comment;
pub use project::{Project, ProjectDeveloper, ProjectSummary};
pub use sprint::{Sprint, SprintDetails};
pub use ticket::{ChangeType, HistoryEntry, Ticket, TicketPriority, TicketStatus, TicketType};
pub use profile::{Profile, ProfileView};
