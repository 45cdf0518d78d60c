//! Storage accessor for snippets and their tag associations.
//!
//! The service layer only talks to [`SnippetStore`]; ownership is enforced
//! above this layer, so every method here operates on raw ids.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewSnippet, Snippet, SnippetChanges, SnippetId};

mod memory;
mod postgres;

pub use memory::MemorySnippetStore;
pub use postgres::PgSnippetStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("{0}")]
    Backend(String),
}

#[async_trait]
pub trait SnippetStore: Send + Sync {
    async fn find_by_id(&self, id: SnippetId) -> Result<Option<Snippet>, StoreError>;

    /// Newest first; ties on `created_at` fall back to id descending.
    async fn find_all_by_owner(&self, owner_id: Uuid) -> Result<Vec<Snippet>, StoreError>;

    /// Inserts the snippet and attaches its tags, reusing tag rows by name.
    async fn insert(&self, snippet: NewSnippet) -> Result<Snippet, StoreError>;

    /// Returns `None` when no row has this id.
    async fn update(&self, id: SnippetId, changes: SnippetChanges) -> Result<Option<Snippet>, StoreError>;

    /// Returns `false` when no row has this id. Tag rows are left in place.
    async fn delete(&self, id: SnippetId) -> Result<bool, StoreError>;
}
