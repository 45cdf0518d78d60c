mod claims;
pub use claims::{AuthUser, Claims};

pub mod snippets;
pub use snippets::{
    NewSnippet, Snippet, SnippetChanges, SnippetId, Tag
};
