use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A comment embedded in a project, sprint, ticket or profile
///
/// Comment lists are append-only from the API's point of view, so their
/// order is the order in which the comments arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    /// Author
    pub user: Uuid,
    /// Author's display name when the comment was written
    pub name: String,
    pub text: String,
    pub date: DateTime<Utc>,
}

impl Comment {
    pub fn new(user: Uuid, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            name: name.into(),
            text: text.into(),
            date: Utc::now(),
        }
    }
}
