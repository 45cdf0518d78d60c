use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ______________________________________ Wire types ______________________________________
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub id: i64,
    pub heading: String,
    pub code: String,
    pub language: String,
    pub owner_id: Uuid,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSnippet {
    pub heading: String,
    pub code: String,
    pub language: String,
    pub tags: Vec<String>,
}

/// Partial update; only the fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnippetEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl SnippetEdit {
    pub fn is_empty(&self) -> bool {
        self.heading.is_none() && self.code.is_none() && self.language.is_none()
    }
}

#[derive(Deserialize)]
struct UpdateResponse {
    snippet: Snippet,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

// ______________________________________ Client ______________________________________
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(err) => err.status().map(|s| s.as_u16()),
        }
    }
}

#[async_trait]
pub trait SnippetApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Snippet>, ClientError>;
    async fn get(&self, id: i64) -> Result<Snippet, ClientError>;
    async fn create(&self, snippet: &NewSnippet) -> Result<Snippet, ClientError>;
    async fn update(&self, id: i64, edit: &SnippetEdit) -> Result<Snippet, ClientError>;
    async fn delete(&self, id: i64) -> Result<(), ClientError>;
}

/// Talks to the snippet service over HTTP with a bearer token.
pub struct HttpSnippetApi {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpSnippetApi {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("{method} {url}");
        self.http.request(method, url).bearer_auth(&self.token)
    }

    async fn checked(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status.canonical_reason().unwrap_or("Request failed").to_string(),
        };
        Err(ClientError::Status { status: status.as_u16(), message })
    }

    async fn json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
        let response = Self::checked(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl SnippetApi for HttpSnippetApi {
    async fn list(&self) -> Result<Vec<Snippet>, ClientError> {
        Self::json(self.request(Method::GET, "/api/dashboard")).await
    }

    async fn get(&self, id: i64) -> Result<Snippet, ClientError> {
        Self::json(self.request(Method::GET, &format!("/api/new/{id}"))).await
    }

    async fn create(&self, snippet: &NewSnippet) -> Result<Snippet, ClientError> {
        Self::json(self.request(Method::POST, "/api/new").json(snippet)).await
    }

    async fn update(&self, id: i64, edit: &SnippetEdit) -> Result<Snippet, ClientError> {
        let request = self.request(Method::PUT, &format!("/api/new/{id}")).json(edit);
        let body: UpdateResponse = Self::json(request).await?;
        Ok(body.snippet)
    }

    async fn delete(&self, id: i64) -> Result<(), ClientError> {
        Self::checked(self.request(Method::DELETE, &format!("/api/new/{id}")).send().await?).await?;
        Ok(())
    }
}
