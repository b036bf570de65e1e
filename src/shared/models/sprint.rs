//! Sprint documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::comment::Comment;
use super::project::ProjectSummary;
use super::ticket::Ticket;

/// Sprint document
///
/// `developers` and `tickets` hold references only; `SprintDetails` is the
/// populated form returned by the single-sprint route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: Uuid,
    pub project: Uuid,
    pub title: String,
    pub description: String,
    pub date_start: DateTime<Utc>,
    pub date_end: DateTime<Utc>,
    pub developers: Vec<Uuid>,
    pub tickets: Vec<Uuid>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sprint with its project and tickets populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintDetails {
    pub id: Uuid,
    pub project: ProjectSummary,
    pub title: String,
    pub description: String,
    pub date_start: DateTime<Utc>,
    pub date_end: DateTime<Utc>,
    pub developers: Vec<Uuid>,
    pub tickets: Vec<Ticket>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SprintDetails {
    /// Populate a sprint; tickets that no longer exist are simply absent
    pub fn new(sprint: Sprint, project: ProjectSummary, tickets: Vec<Ticket>) -> Self {
        Self {
            id: sprint.id,
            project,
            title: sprint.title,
            description: sprint.description,
            date_start: sprint.date_start,
            date_end: sprint.date_end,
            developers: sprint.developers,
            tickets,
            comments: sprint.comments,
            created_at: sprint.created_at,
            updated_at: sprint.updated_at,
        }
    }
}
