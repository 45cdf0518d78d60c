use std::sync::Arc;

use serde::Deserialize;

use crate::{
    errors::ApiError,
    models::{AuthUser, NewSnippet, Snippet, SnippetChanges, SnippetId},
    store::SnippetStore,
    utils::{normalize_tags, test_text_field},
};

#[derive(Debug, Default, Deserialize)]
pub struct CreateSnippetRequest {
    pub heading: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Partial update body. Tags are not updatable and are ignored if sent.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSnippetRequest {
    pub heading: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
}

pub fn parse_snippet_id(raw: &str) -> Result<SnippetId, ApiError> {
    raw.trim()
        .parse::<SnippetId>()
        .map_err(|_| ApiError::Validation(format!("Invalid snippet id: {raw}")))
}

fn present(field: &str, value: Option<String>) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::Validation(format!("{field} is required")))
}

fn required(field: &str, value: Option<String>) -> Result<String, ApiError> {
    optional(field, present(field, value)?)
}

fn optional(field: &str, value: String) -> Result<String, ApiError> {
    match test_text_field(field, &value) {
        Some(err) => Err(ApiError::Validation(err)),
        None => Ok(value),
    }
}

/// Snippet operations scoped to the requesting owner.
#[derive(Clone)]
pub struct SnippetService {
    store: Arc<dyn SnippetStore>,
}

impl SnippetService {
    pub fn new(store: Arc<dyn SnippetStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, user: AuthUser, req: CreateSnippetRequest) -> Result<Snippet, ApiError> {
        let new_snippet = NewSnippet {
            owner_id: user.id,
            heading: required("heading", req.heading)?,
            code: present("code", req.code)?,
            language: required("language", req.language)?,
            tags: normalize_tags(req.tags.unwrap_or_default()),
        };

        let snippet = self.store.insert(new_snippet).await?;
        log::info!("user {} created snippet {}", user.id, snippet.id);
        Ok(snippet)
    }

    pub async fn list(&self, user: AuthUser) -> Result<Vec<Snippet>, ApiError> {
        Ok(self.store.find_all_by_owner(user.id).await?)
    }

    pub async fn get(&self, user: AuthUser, id: SnippetId) -> Result<Snippet, ApiError> {
        self.load_owned(user, id).await
    }

    pub async fn update(
        &self,
        user: AuthUser,
        id: SnippetId,
        req: UpdateSnippetRequest,
    ) -> Result<Snippet, ApiError> {
        self.load_owned(user, id).await?;

        let changes = SnippetChanges {
            heading: req.heading.map(|v| optional("heading", v)).transpose()?,
            code: req.code,
            language: req.language.map(|v| optional("language", v)).transpose()?,
        };
        if changes.is_empty() {
            return Err(ApiError::Validation(
                "At least one of heading, code or language is required".to_string(),
            ));
        }

        // A concurrent delete between the ownership check and the write surfaces as NotFound.
        let snippet = self.store.update(id, changes).await?.ok_or(ApiError::NotFound)?;
        log::info!("user {} updated snippet {}", user.id, id);
        Ok(snippet)
    }

    pub async fn delete(&self, user: AuthUser, id: SnippetId) -> Result<(), ApiError> {
        self.load_owned(user, id).await?;

        if !self.store.delete(id).await? {
            return Err(ApiError::NotFound);
        }
        log::info!("user {} deleted snippet {}", user.id, id);
        Ok(())
    }

    /// Loads a snippet and checks that `user` owns it.
    async fn load_owned(&self, user: AuthUser, id: SnippetId) -> Result<Snippet, ApiError> {
        let snippet = self.store.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
        if snippet.owner_id != user.id {
            log::warn!("user {} denied access to snippet {}", user.id, id);
            return Err(ApiError::Forbidden);
        }
        Ok(snippet)
    }
}
