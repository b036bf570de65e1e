//! Developer profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::comment::Comment;
use super::user::UserSummary;

/// Profile document, one per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub user: Uuid,
    pub bio: String,
    pub skills: Vec<String>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile with its user populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: Uuid,
    pub user: UserSummary,
    pub bio: String,
    pub skills: Vec<String>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileView {
    pub fn new(profile: Profile, user: UserSummary) -> Self {
        Self {
            id: profile.id,
            user,
            bio: profile.bio,
            skills: profile.skills,
            comments: profile.comments,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }

    /// Case-insensitive match on username, first or last name, or any skill
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        let hit = |s: &str| s.to_lowercase().contains(&term);
        hit(&self.user.username)
            || hit(&self.user.first_name)
            || hit(&self.user.last_name)
            || self.skills.iter().any(|s| hit(s))
    }
}
