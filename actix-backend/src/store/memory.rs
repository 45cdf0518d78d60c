use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{SnippetStore, StoreError};
use crate::models::{NewSnippet, Snippet, SnippetChanges, SnippetId, Tag};

struct StoredSnippet {
    heading: String,
    code: String,
    language: String,
    owner_id: Uuid,
    tag_ids: Vec<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct MemoryState {
    last_snippet_id: SnippetId,
    last_tag_id: i64,
    snippets: BTreeMap<SnippetId, StoredSnippet>,
    tags: BTreeMap<i64, String>,
    tags_by_name: HashMap<String, i64>,
}

impl MemoryState {
    fn tag_id_for(&mut self, name: &str) -> i64 {
        if let Some(id) = self.tags_by_name.get(name) {
            return *id;
        }
        self.last_tag_id += 1;
        let id = self.last_tag_id;
        self.tags.insert(id, name.to_string());
        self.tags_by_name.insert(name.to_string(), id);
        id
    }

    fn materialize(&self, id: SnippetId, stored: &StoredSnippet) -> Snippet {
        let tags = stored
            .tag_ids
            .iter()
            .filter_map(|tag_id| {
                self.tags.get(tag_id).map(|name| Tag { id: *tag_id, name: name.clone() })
            })
            .collect();

        Snippet {
            id,
            heading: stored.heading.clone(),
            code: stored.code.clone(),
            language: stored.language.clone(),
            owner_id: stored.owner_id,
            tags,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

/// Process-local store used for tests and for running without Postgres.
#[derive(Default)]
pub struct MemorySnippetStore {
    state: RwLock<MemoryState>,
}

impl MemorySnippetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every tag ever created, in creation order.
    pub async fn tags(&self) -> Vec<Tag> {
        let state = self.state.read().await;
        state
            .tags
            .iter()
            .map(|(id, name)| Tag { id: *id, name: name.clone() })
            .collect()
    }
}

#[async_trait]
impl SnippetStore for MemorySnippetStore {
    async fn find_by_id(&self, id: SnippetId) -> Result<Option<Snippet>, StoreError> {
        let state = self.state.read().await;
        Ok(state.snippets.get(&id).map(|stored| state.materialize(id, stored)))
    }

    async fn find_all_by_owner(&self, owner_id: Uuid) -> Result<Vec<Snippet>, StoreError> {
        let state = self.state.read().await;
        let mut snippets: Vec<Snippet> = state
            .snippets
            .iter()
            .filter(|(_, stored)| stored.owner_id == owner_id)
            .map(|(id, stored)| state.materialize(*id, stored))
            .collect();

        snippets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(snippets)
    }

    async fn insert(&self, snippet: NewSnippet) -> Result<Snippet, StoreError> {
        let mut state = self.state.write().await;

        let mut tag_ids = Vec::with_capacity(snippet.tags.len());
        for name in &snippet.tags {
            let tag_id = state.tag_id_for(name);
            if !tag_ids.contains(&tag_id) {
                tag_ids.push(tag_id);
            }
        }

        state.last_snippet_id += 1;
        let id = state.last_snippet_id;
        let now = Utc::now();
        let stored = StoredSnippet {
            heading: snippet.heading,
            code: snippet.code,
            language: snippet.language,
            owner_id: snippet.owner_id,
            tag_ids,
            created_at: now,
            updated_at: now,
        };

        let created = state.materialize(id, &stored);
        state.snippets.insert(id, stored);
        Ok(created)
    }

    async fn update(&self, id: SnippetId, changes: SnippetChanges) -> Result<Option<Snippet>, StoreError> {
        let mut state = self.state.write().await;
        let Some(stored) = state.snippets.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(heading) = changes.heading {
            stored.heading = heading;
        }
        if let Some(code) = changes.code {
            stored.code = code;
        }
        if let Some(language) = changes.language {
            stored.language = language;
        }
        stored.updated_at = Utc::now();

        Ok(state.snippets.get(&id).map(|stored| state.materialize(id, stored)))
    }

    async fn delete(&self, id: SnippetId) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.snippets.remove(&id).is_some())
    }
}
