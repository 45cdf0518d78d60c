use std::sync::Arc;

use chrono::Duration;
use snippet_backend::{identity::issue_token, store::MemorySnippetStore};
use uuid::Uuid;

pub const SECRET: &str = "integration-secret";

pub fn bearer(user_id: Uuid) -> (&'static str, String) {
    let token = issue_token(SECRET, user_id, Duration::minutes(15)).unwrap();
    ("Authorization", format!("Bearer {token}"))
}

pub fn memory_store() -> Arc<MemorySnippetStore> {
    Arc::new(MemorySnippetStore::new())
}

/// Builds the service the same way `main` does, over the given store.
macro_rules! spawn_app {
    ($store:expr) => {{
        let store: std::sync::Arc<dyn snippet_backend::store::SnippetStore> = $store.clone();
        let identity = snippet_backend::middleware::jwt_middleware::RequireIdentity::new(
            std::sync::Arc::new(snippet_backend::identity::JwtIdentityProvider::new(common::SECRET)),
        );
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(snippet_backend::AppState::new(store)))
                .app_data(snippet_backend::routes::snippet_routes::json_config())
                .configure(|cfg| snippet_backend::routes::snippet_routes::config(cfg, identity)),
        )
        .await
    }};
}
