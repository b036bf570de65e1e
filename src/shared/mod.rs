//! Shared Module
//!
//! Types that are shared between the server and API clients. Everything in
//! here is plain data: serializable document models, the application
//! configuration and the validation error types.

/// Document models for every tracked resource
pub mod models;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use error::{FieldError, SharedError};
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use models::{
    ChangeType, Comment, HistoryEntry, Profile, ProfileView, Project, ProjectDeveloper,
    ProjectSummary, Role, Sprint, SprintDetails, Ticket, TicketPriority, TicketStatus,
    TicketType, UserSummary,
};
