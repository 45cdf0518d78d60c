pub mod snippet_service;
pub use snippet_service::{parse_snippet_id, CreateSnippetRequest, SnippetService, UpdateSnippetRequest};
