//! Project documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::comment::Comment;

/// A developer entry embedded in a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDeveloper {
    pub user: Uuid,
    pub added_at: DateTime<Utc>,
}

/// Project document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    /// User who created the project
    pub creator: Uuid,
    /// Unique across all projects
    pub name: String,
    pub description: String,
    pub target_completion_date: DateTime<Utc>,
    pub completion_date: Option<DateTime<Utc>>,
    /// User responsible for the project
    pub manager: Uuid,
    pub developers: Vec<ProjectDeveloper>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn is_manager(&self, user_id: Uuid) -> bool {
        self.manager == user_id
    }

    pub fn is_developer(&self, user_id: Uuid) -> bool {
        self.developers.iter().any(|d| d.user == user_id)
    }

    /// Manager or listed developer
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.is_manager(user_id) || self.is_developer(user_id)
    }

    /// Add a developer; returns false if already listed
    pub fn add_developer(&mut self, user_id: Uuid) -> bool {
        if self.is_developer(user_id) {
            return false;
        }
        self.developers.push(ProjectDeveloper {
            user: user_id,
            added_at: Utc::now(),
        });
        true
    }

    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id,
            name: self.name.clone(),
            manager: self.manager,
        }
    }
}

/// Short project reference used when populating sprints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub manager: Uuid,
}
