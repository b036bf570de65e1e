//! Ticket documents and their enumerated fields.
//!
//! The enumerated fields travel as the human-readable labels the client
//! shows in its dropdowns (`"In Progress"`, `"UpdateStatus"`, ...), and are
//! stored the same way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::comment::Comment;
use crate::shared::error::SharedError;

/// Implements `as_str`, `Display` and a case-insensitive `FromStr` for a
/// label enum.
macro_rules! labelled_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = SharedError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| SharedError::invalid_value($kind, s))
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketType {
    Bug,
    Feature,
    Task,
    Other,
}

labelled_enum!(TicketType, "ticket type", {
    Bug => "Bug",
    Feature => "Feature",
    Task => "Task",
    Other => "Other",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Critical,
}

labelled_enum!(TicketPriority, "ticket priority", {
    Low => "Low",
    Medium => "Medium",
    High => "High",
    Critical => "Critical",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TicketStatus {
    #[default]
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "On Hold")]
    OnHold,
    Completed,
}

labelled_enum!(TicketStatus, "ticket status", {
    Open => "Open",
    InProgress => "In Progress",
    OnHold => "On Hold",
    Completed => "Completed",
});

/// Kind of change recorded in a ticket's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    Created,
    UpdateDetails,
    UpdateAssignedDev,
    UpdateStatus,
    Completed,
    Other,
}

labelled_enum!(ChangeType, "change type", {
    Created => "Created",
    UpdateDetails => "UpdateDetails",
    UpdateAssignedDev => "UpdateAssignedDev",
    UpdateStatus => "UpdateStatus",
    Completed => "Completed",
    Other => "Other",
});

/// One entry of a ticket's change log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: Uuid,
    pub change_type: ChangeType,
    /// User who made the change
    pub user: Uuid,
    pub date: DateTime<Utc>,
    /// Readable field diffs, e.g. `status: Open -> Completed`
    pub changes: Vec<String>,
}

impl HistoryEntry {
    pub fn new(change_type: ChangeType, user: Uuid, changes: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            change_type,
            user,
            date: Utc::now(),
            changes,
        }
    }
}

/// Ticket document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    pub project: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub description: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub assigned_developer: Option<Uuid>,
    pub resolution_summary: Option<String>,
    pub date_due: Option<DateTime<Utc>>,
    pub date_completed: Option<DateTime<Utc>>,
    pub history: Vec<HistoryEntry>,
    pub comments: Vec<Comment>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn is_completed(&self) -> bool {
        self.status == TicketStatus::Completed
    }
}
