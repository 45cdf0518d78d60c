use std::sync::Arc;

use crate::{
    config::StorageBackend,
    services::SnippetService,
    store::{MemorySnippetStore, PgSnippetStore, SnippetStore, StoreError},
};

pub mod config;
pub mod errors;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

pub struct AppState {
    pub snippets: SnippetService,
}

impl AppState {
    pub fn new(store: Arc<dyn SnippetStore>) -> Self {
        Self { snippets: SnippetService::new(store) }
    }
}

/// Opens the configured backend; Postgres is migrated before it is handed out.
pub async fn open_store(storage: &StorageBackend) -> Result<Arc<dyn SnippetStore>, StoreError> {
    match storage {
        StorageBackend::Postgres { database_url, max_connections } => {
            let store = PgSnippetStore::connect(database_url, *max_connections).await?;
            store.migrate().await?;
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            log::warn!("using in-memory storage; snippets will not survive a restart");
            Ok(Arc::new(MemorySnippetStore::new()))
        }
    }
}
