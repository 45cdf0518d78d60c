use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SnippetId = i64;

// ______________________________________ Snippets ______________________________________
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: SnippetId,
    pub heading: String,
    pub code: String,
    pub language: String,
    pub owner_id: Uuid,
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a snippet insert. Tag names are already trimmed and deduplicated.
#[derive(Debug, Clone)]
pub struct NewSnippet {
    pub owner_id: Uuid,
    pub heading: String,
    pub code: String,
    pub language: String,
    pub tags: Vec<String>,
}

/// Field overwrites for an update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct SnippetChanges {
    pub heading: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
}

impl SnippetChanges {
    pub fn is_empty(&self) -> bool {
        self.heading.is_none() && self.code.is_none() && self.language.is_none()
    }
}

// ______________________________________ Snippet Tags ______________________________________
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}
